//! Switch-facing layer.
//!
//! Owns the two seams to the switch: [`SwitchTransport`] for control actions
//! and [`EventFeed`] for notification events, plus the action/event value
//! types that cross them. [`EventHub`] is an in-process feed that a connection
//! layer can push decoded events into.

mod action;
mod context;
mod error;
mod event;
mod feed;
mod hub;
mod transport;

pub use action::{Action, ActionResponse, OriginateAction, RedirectAction, CALLING_PRES_PROHIBITED};
pub use context::SwitchContext;
pub use error::{FeedError, SwitchError};
pub use event::{
    BridgeEvent, EventKind, HangupEvent, NewChannelEvent, OriginateResponseEvent, SwitchEvent,
};
pub use feed::{EventFeed, EventListener, ListenerPriority, ListenerRegistration};
pub use hub::EventHub;
pub use transport::{
    SwitchActions, SwitchTransport, GET_VARIABLE_TIMEOUT, HANGUP_TIMEOUT, SET_VARIABLE_TIMEOUT,
};
