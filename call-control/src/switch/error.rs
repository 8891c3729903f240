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

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Failures reported by a [`SwitchTransport`](crate::switch::SwitchTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    Timeout { action: String, after: Duration },
    ActionRejected { action: String, message: String },
    NotConnected,
    ChannelNotFound { channel: String },
    Protocol { detail: String },
}

impl Display for SwitchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SwitchError::Timeout { action, after } => {
                write!(f, "{action} action timed out after {}ms", after.as_millis())
            }
            SwitchError::ActionRejected { action, message } => {
                write!(f, "{action} action rejected: {message}")
            }
            SwitchError::NotConnected => write!(f, "not connected to the switch"),
            SwitchError::ChannelNotFound { channel } => write!(f, "channel {channel} not found"),
            SwitchError::Protocol { detail } => write!(f, "protocol error: {detail}"),
        }
    }
}

impl Error for SwitchError {}

/// Listener registration failures reported by an [`EventFeed`](crate::switch::EventFeed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    RegistrationRejected { listener: String, detail: String },
    UnknownRegistration { listener: String },
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::RegistrationRejected { listener, detail } => {
                write!(f, "registration of listener {listener} rejected: {detail}")
            }
            FeedError::UnknownRegistration { listener } => {
                write!(f, "listener {listener} is not registered")
            }
        }
    }
}

impl Error for FeedError {}
