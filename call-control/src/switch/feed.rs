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

//! Event-feed seam: listener contract and registration handles.

use crate::switch::error::FeedError;
use crate::switch::event::{EventKind, SwitchEvent};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Delivery order between listeners interested in the same event: a listener
/// is handed an event only after every higher-priority listener finished it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ListenerPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Receives notification events from an [`EventFeed`].
///
/// A feed only delivers the kinds returned by `required_events`, and never
/// calls `on_event` concurrently for the same registration.
#[async_trait]
pub trait EventListener: Send + Sync {
    fn name(&self) -> &str;

    fn required_events(&self) -> HashSet<EventKind>;

    fn priority(&self) -> ListenerPriority {
        ListenerPriority::Normal
    }

    async fn on_event(&self, event: SwitchEvent);
}

/// Handle returned by [`EventFeed::register_listener`]; hand it back to
/// [`EventFeed::unregister_listener`] to stop delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerRegistration {
    id: u64,
    listener_name: String,
}

impl ListenerRegistration {
    pub fn new(id: u64, listener_name: &str) -> Self {
        Self {
            id,
            listener_name: listener_name.to_string(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn listener_name(&self) -> &str {
        &self.listener_name
    }
}

#[async_trait]
pub trait EventFeed: Send + Sync {
    async fn register_listener(
        &self,
        listener: Arc<dyn EventListener>,
    ) -> Result<ListenerRegistration, FeedError>;

    async fn unregister_listener(&self, registration: &ListenerRegistration)
        -> Result<(), FeedError>;
}
