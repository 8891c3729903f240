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

use crate::model::channel::Channel;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);

/// Failures when regrouping channels between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    ChannelNotInCall { channel: String, call_id: u64 },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ChannelNotInCall { channel, call_id } => {
                write!(f, "channel {channel} is not part of call {call_id}")
            }
        }
    }
}

impl Error for ModelError {}

/// A logical conversation grouping one or more channels.
#[derive(Debug, Clone)]
pub struct Call {
    id: u64,
    channels: Vec<Channel>,
}

impl Call {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            id: NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed),
            channels,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn contains(&self, channel: &Channel) -> bool {
        self.channels.iter().any(|member| member.is_same(channel))
    }

    /// Builds a new call that owns only `channel`.
    pub fn split(&self, channel: &Channel) -> Result<Call, ModelError> {
        self.channels
            .iter()
            .find(|member| member.is_same(channel))
            .map(|member| Call::new(vec![member.clone()]))
            .ok_or_else(|| ModelError::ChannelNotInCall {
                channel: channel.name().to_string(),
                call_id: self.id,
            })
    }
}
