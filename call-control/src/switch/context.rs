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

use crate::settings::SwitchSettings;
use crate::switch::feed::EventFeed;
use crate::switch::transport::SwitchTransport;
use std::sync::Arc;

/// The switch an operation talks to, handed to each operation when it is built.
#[derive(Clone)]
pub struct SwitchContext {
    pub(crate) transport: Arc<dyn SwitchTransport>,
    pub(crate) feed: Arc<dyn EventFeed>,
    pub(crate) settings: Arc<SwitchSettings>,
}

impl SwitchContext {
    pub fn new(
        transport: Arc<dyn SwitchTransport>,
        feed: Arc<dyn EventFeed>,
        settings: SwitchSettings,
    ) -> Self {
        Self {
            transport,
            feed,
            settings: Arc::new(settings),
        }
    }

    pub fn transport(&self) -> &Arc<dyn SwitchTransport> {
        &self.transport
    }

    pub fn feed(&self) -> &Arc<dyn EventFeed> {
        &self.feed
    }

    pub fn settings(&self) -> &SwitchSettings {
        &self.settings
    }
}
