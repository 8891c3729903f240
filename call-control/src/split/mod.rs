//! Call splitting.
//!
//! [`SplitActivity`] moves both channels of a two-party call to the holding
//! extension with a single redirect, confirms each arrived by polling its
//! [`HoldActivityAction`], and regroups them into two single-channel calls.
//! No switch events are correlated.

mod error;
mod hold;
mod split_activity;

pub use error::SplitError;
pub use hold::HoldActivityAction;
pub use split_activity::{
    SplitActivity, HOLD_POLL_INTERVAL, HOLD_TIMEOUT, PROXY_ID_VARIABLE, QUIESCENCE_TIMEOUT,
    REDIRECT_TIMEOUT,
};
