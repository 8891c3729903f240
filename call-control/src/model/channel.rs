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

//! Switch channel handle with stable identity and a current activity slot.

use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

const LOCAL_CHANNEL_PREFIX: &str = "local/";

static NEXT_CHANNEL_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// What a channel does while it is parked outside of normal call routing.
///
/// The switch side calls [`Channel::run_current_activity`] once the channel
/// arrives at the location the action was attached for.
pub trait ChannelActivityAction: Send + Sync {
    fn name(&self) -> &str;

    fn on_arrival(&self, channel: &Channel);
}

struct ChannelInner {
    identity: u64,
    name: String,
    unique_id: String,
    in_transition: AtomicBool,
    current_activity: Mutex<Option<Arc<dyn ChannelActivityAction>>>,
}

/// Cheaply cloneable handle to one switch channel.
///
/// Clones share identity: [`Channel::is_same`] compares the identity assigned at
/// construction, never the channel name, because the switch renames channels
/// during masquerades.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    pub fn new(name: &str, unique_id: &str) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                identity: NEXT_CHANNEL_IDENTITY.fetch_add(1, Ordering::Relaxed),
                name: name.to_string(),
                unique_id: unique_id.to_string(),
                in_transition: AtomicBool::new(false),
                current_activity: Mutex::new(None),
            }),
        }
    }

    pub fn identity(&self) -> u64 {
        self.inner.identity
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn unique_id(&self) -> &str {
        &self.inner.unique_id
    }

    pub fn is_same(&self, other: &Channel) -> bool {
        self.inner.identity == other.inner.identity
    }

    /// `true` for switch-internal linking channels (`Local/...`) that never
    /// represent a real party.
    pub fn is_local(&self) -> bool {
        self.inner
            .name
            .get(..LOCAL_CHANNEL_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(LOCAL_CHANNEL_PREFIX))
    }

    pub fn set_in_transition(&self, in_transition: bool) {
        self.inner
            .in_transition
            .store(in_transition, Ordering::Release);
    }

    /// A quiescent channel is not mid-transition and is safe to redirect.
    pub fn is_quiescent(&self) -> bool {
        !self.inner.in_transition.load(Ordering::Acquire)
    }

    pub fn set_current_activity_action(&self, action: Arc<dyn ChannelActivityAction>) {
        *self
            .inner
            .current_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(action);
    }

    pub fn current_activity_action(&self) -> Option<Arc<dyn ChannelActivityAction>> {
        self.inner
            .current_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invoked when the channel reaches the dialplan location its current
    /// activity action was attached for. Returns `false` when no action is set.
    pub fn run_current_activity(&self) -> bool {
        match self.current_activity_action() {
            Some(action) => {
                action.on_arrival(self);
                true
            }
            None => false,
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

impl Debug for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("identity", &self.inner.identity)
            .field("name", &self.inner.name)
            .field("unique_id", &self.inner.unique_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Channel, ChannelActivityAction};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingAction {
        arrivals: AtomicUsize,
    }

    impl ChannelActivityAction for CountingAction {
        fn name(&self) -> &str {
            "counting"
        }

        fn on_arrival(&self, _channel: &Channel) {
            self.arrivals.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn clones_share_identity_but_equal_names_do_not() {
        let channel = Channel::new("SIP/100-00000001", "1700000000.1");
        let twin = Channel::new("SIP/100-00000001", "1700000000.1");

        assert!(channel.is_same(&channel.clone()));
        assert!(!channel.is_same(&twin));
    }

    #[test]
    fn local_prefix_is_case_insensitive() {
        assert!(Channel::new("Local/100@default-00000001;1", "1").is_local());
        assert!(Channel::new("LOCAL/100@default-00000001;2", "2").is_local());
        assert!(!Channel::new("SIP/100-00000001", "3").is_local());
        assert!(!Channel::new("Loc", "4").is_local());
    }

    #[test]
    fn run_current_activity_reports_missing_action() {
        let channel = Channel::new("SIP/100-00000001", "1");
        assert!(!channel.run_current_activity());

        let action = Arc::new(CountingAction::default());
        channel.set_current_activity_action(action.clone());

        assert!(channel.run_current_activity());
        assert_eq!(action.arrivals.load(Ordering::Relaxed), 1);
    }
}
