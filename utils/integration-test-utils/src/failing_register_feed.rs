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
use call_control::{EventFeed, EventListener, FeedError, ListenerRegistration};
use std::sync::Arc;
use tracing::debug;

/// Feed that refuses every registration.
pub struct FailingRegisterFeed {
    name: Arc<String>,
}

impl FailingRegisterFeed {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::new(name.to_string()),
        }
    }
}

#[async_trait]
impl EventFeed for FailingRegisterFeed {
    async fn register_listener(
        &self,
        listener: Arc<dyn EventListener>,
    ) -> Result<ListenerRegistration, FeedError> {
        debug!("{}: registering listener {}", self.name, listener.name());
        Err(FeedError::RegistrationRejected {
            listener: listener.name().to_string(),
            detail: "Failing to register listener".to_string(),
        })
    }

    async fn unregister_listener(&self, registration: &ListenerRegistration) -> Result<(), FeedError> {
        debug!(
            "{} unregistering listener {}",
            &self.name,
            registration.listener_name()
        );
        Ok(())
    }
}
