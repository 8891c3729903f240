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

use crate::model::ModelError;
use crate::switch::SwitchError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a call could not be split. None of these leave the original call
/// regrouped.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitError {
    NotTwoChannels { count: usize },
    /// Both sides are the same channel; nothing was sent to the switch.
    SameChannel { channel: String },
    ChannelsInTransition,
    TagFailed(SwitchError),
    RedirectFailed(SwitchError),
    HoldNotReached { channels: Vec<String> },
    Regroup(ModelError),
}

impl Display for SplitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitError::NotTwoChannels { count } => {
                write!(f, "split needs exactly two channels, call has {count}")
            }
            SplitError::SameChannel { channel } => {
                write!(f, "cannot split channel {channel} from itself")
            }
            SplitError::ChannelsInTransition => {
                write!(f, "quiescence wait failed, channels still in transition")
            }
            SplitError::TagFailed(err) => write!(f, "failed to tag channel: {err}"),
            SplitError::RedirectFailed(err) => write!(f, "redirect to holding failed: {err}"),
            SplitError::HoldNotReached { channels } => write!(
                f,
                "channels did not reach holding in time: {}",
                channels.join(",")
            ),
            SplitError::Regroup(err) => write!(f, "failed to regroup channels: {err}"),
        }
    }
}

impl Error for SplitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SplitError::TagFailed(err) | SplitError::RedirectFailed(err) => Some(err),
            SplitError::Regroup(err) => Some(err),
            _ => None,
        }
    }
}
