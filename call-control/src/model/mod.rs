//! Channel and call domain model.
//!
//! These are thin handles: the switch owns the real channel state, and the
//! engines only need identity, the local/internal predicate, quiescence and
//! the current activity attachment.

mod call;
mod channel;
mod endpoint;

pub use call::{Call, ModelError};
pub use channel::{Channel, ChannelActivityAction};
pub use endpoint::{CallerId, EndPoint};
