/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! # call-control
//!
//! `call-control` drives a telephony switch through its asynchronous control
//! protocol and correlates the switch's notification events back to the
//! operation that caused them.
//!
//! Two operations are provided:
//!
//! - [`Originate`] dials a target and waits, bounded by the dial timeout, until
//!   the switch has both accepted the call and revealed the channel it created.
//! - [`SplitActivity`] splits a two-channel call into two single-channel calls
//!   by parking both channels at the holding extension.
//!
//! Both talk to the switch through an explicit [`SwitchContext`]: a
//! [`SwitchTransport`] for control actions, an [`EventFeed`] for notification
//! events, and the profile [`SwitchSettings`]. [`EventHub`] is an in-process
//! feed a connection layer can push decoded events into.
//!
//! ## Split contract
//!
//! A call whose two sides are the same channel is refused before anything
//! reaches the switch.
//!
//! ```
//! use std::sync::Arc;
//! use call_control::{Call, Channel, EventHub, SplitActivity, SplitError, SwitchContext, SwitchSettings};
//!
//! # pub mod refusing_transport {
//! #     use async_trait::async_trait;
//! #     use call_control::{Action, ActionResponse, SwitchError, SwitchTransport};
//! #     use std::time::Duration;
//! #
//! #     pub struct RefusingTransport;
//! #
//! #     #[async_trait]
//! #     impl SwitchTransport for RefusingTransport {
//! #         async fn send_action(
//! #             &self,
//! #             _action: Action,
//! #             _timeout: Duration,
//! #         ) -> Result<ActionResponse, SwitchError> {
//! #             Err(SwitchError::NotConnected)
//! #         }
//! #     }
//! # }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let context = SwitchContext::new(
//!     Arc::new(refusing_transport::RefusingTransport),
//!     Arc::new(EventHub::new()),
//!     SwitchSettings::default(),
//! );
//!
//! let channel = Channel::new("SIP/100-00000001", "1700000000.1");
//! let call = Call::new(vec![channel.clone(), channel]);
//!
//! let split = SplitActivity::start(context, call).await;
//! assert!(!split.success());
//! assert!(matches!(split.error(), Some(SplitError::SameChannel { .. })));
//! assert!(split.lhs_call().is_none());
//! # });
//! ```
//!
//! ## Observability
//!
//! Library code logs through `tracing`. Every log line carries an `event` field
//! holding one of the names in [`observability::events`] plus a `component`
//! field, so subscribers can filter on stable names rather than message text.

pub mod activity;
pub mod correlation;
pub mod model;
pub mod observability;
pub mod retry;
pub mod settings;
pub mod split;
pub mod switch;

pub use activity::{spawn_activity, Activity, ActivityCallback, ActivityStatus};
pub use correlation::{
    NewChannelListener, Originate, OriginateOptions, OriginatePhase, OriginateRequest,
    OriginateResult,
};
pub use model::{Call, CallerId, Channel, ChannelActivityAction, EndPoint, ModelError};
pub use retry::{poll_until, retry, RetryOutcome, RetryPolicy};
pub use settings::{SettingsError, SwitchSettings};
pub use split::{HoldActivityAction, SplitActivity, SplitError};
pub use switch::{
    Action, ActionResponse, EventFeed, EventHub, EventKind, EventListener, FeedError,
    ListenerPriority, ListenerRegistration, SwitchActions, SwitchContext, SwitchError, SwitchEvent,
    SwitchTransport,
};
