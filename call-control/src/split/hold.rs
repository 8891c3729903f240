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

use crate::model::{Channel, ChannelActivityAction};
use crate::observability::events;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const COMPONENT: &str = "hold";

/// Parks a channel silently at the holding extension and records that it got
/// there.
#[derive(Debug, Default)]
pub struct HoldActivityAction {
    reached: AtomicBool,
}

impl HoldActivityAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_reached_hold(&self) -> bool {
        self.reached.load(Ordering::Acquire)
    }
}

impl ChannelActivityAction for HoldActivityAction {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn on_arrival(&self, channel: &Channel) {
        if !self.reached.swap(true, Ordering::AcqRel) {
            debug!(
                event = events::HOLD_REACHED,
                component = COMPONENT,
                channel = %channel,
                "channel reached holding"
            );
        }
    }
}
