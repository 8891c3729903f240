//! Structured logging vocabulary.
//!
//! Library code emits `tracing` events tagged with `event = events::*` and a
//! `component` field, and never installs a global subscriber. Binaries and
//! tests initialize `tracing_subscriber` themselves.

pub mod events;
pub mod fields;
