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

use async_trait::async_trait;
use call_control::{
    ActivityCallback, ActivityStatus, Channel, EventKind, EventListener, ListenerPriority,
    NewChannelListener, SwitchEvent,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

/// Keeps every destination channel an origination reports.
#[derive(Clone, Default)]
pub struct RecordingChannelListener {
    channels: Arc<Mutex<Vec<Channel>>>,
}

impl RecordingChannelListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NewChannelListener for RecordingChannelListener {
    fn channel_update(&self, channel: &Channel) {
        debug!("within recording_channel_listener! channel: {channel}");
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(channel.clone());
    }
}

/// Keeps every switch event delivered to it, tagged with its own name so
/// several recorders can share one store.
#[derive(Clone)]
pub struct RecordingEventListener {
    name: String,
    interest: HashSet<EventKind>,
    priority: ListenerPriority,
    event_store: Arc<AsyncMutex<Vec<(String, SwitchEvent)>>>,
}

impl RecordingEventListener {
    pub fn new(
        name: &str,
        interest: HashSet<EventKind>,
        priority: ListenerPriority,
        event_store: Arc<AsyncMutex<Vec<(String, SwitchEvent)>>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            interest,
            priority,
            event_store,
        }
    }

    pub fn retrieve_event_store(&self) -> Arc<AsyncMutex<Vec<(String, SwitchEvent)>>> {
        self.event_store.clone()
    }
}

#[async_trait]
impl EventListener for RecordingEventListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_events(&self) -> HashSet<EventKind> {
        self.interest.clone()
    }

    fn priority(&self) -> ListenerPriority {
        self.priority
    }

    async fn on_event(&self, event: SwitchEvent) {
        debug!("within {}! event: {:?}", self.name, event.kind());
        self.event_store
            .lock()
            .await
            .push((self.name.clone(), event));
    }
}

/// Keeps every activity progress report.
#[derive(Clone, Default)]
pub struct RecordingActivityCallback {
    reports: Arc<AsyncMutex<Vec<(String, ActivityStatus)>>>,
}

impl RecordingActivityCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reports(&self) -> Vec<(String, ActivityStatus)> {
        self.reports.lock().await.clone()
    }
}

#[async_trait]
impl ActivityCallback for RecordingActivityCallback {
    async fn progress(&self, activity: &str, status: ActivityStatus) {
        debug!("within recording_activity_callback! {activity}: {status}");
        self.reports
            .lock()
            .await
            .push((activity.to_string(), status));
    }
}
