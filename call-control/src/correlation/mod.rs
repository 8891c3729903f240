//! Origination correlation.
//!
//! The switch answers an originate request asynchronously and never names the
//! channel it created. [`Originate`] tags the request with a fresh token that
//! the switch copies onto descendant channels, then watches new-channel and
//! bridge events for a channel carrying that token. The caller is released
//! once both the response and the channel are in, or a relevant hangup or
//! abort settles the attempt.

mod discovery;
mod originate;
mod signal;
mod state;

pub use discovery::{INHERITABLE_VARIABLE_PREFIX, ORIGINATE_ID_VARIABLE};
pub use originate::{
    NewChannelListener, Originate, OriginateOptions, OriginateRequest, COMPLETION_GRACE,
    FALLBACK_DIAL_TIMEOUT,
};
pub use state::{OriginatePhase, OriginateResult};
