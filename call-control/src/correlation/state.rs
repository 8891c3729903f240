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

//! Per-operation origination state and its transitions.

use crate::model::Channel;

/// Where one origination attempt stands.
///
/// The response event and the destination discovery may arrive in either
/// order; `Resolved` is reached once both were seen or a destination hangup
/// settled the attempt, `Aborted` once a monitored channel hung up or the
/// caller aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginatePhase {
    Pending,
    ResponseSeen,
    ChannelSeen,
    Resolved,
    Aborted,
}

#[derive(Debug)]
pub(crate) struct OriginateState {
    pub(crate) phase: OriginatePhase,
    pub(crate) token: Option<String>,
    pub(crate) success: bool,
    pub(crate) destination: Option<Channel>,
    pub(crate) hungup: bool,
    pub(crate) channel_hungup: bool,
    /// The destination hung up on its own; there is nothing left to clean up.
    pub(crate) destination_gone: bool,
}

impl OriginateState {
    pub(crate) fn new() -> Self {
        Self {
            phase: OriginatePhase::Pending,
            token: None,
            success: false,
            destination: None,
            hungup: false,
            channel_hungup: false,
            destination_gone: false,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        matches!(
            self.phase,
            OriginatePhase::Resolved | OriginatePhase::Aborted
        )
    }

    /// Records the switch's verdict. Returns `true` when the destination was
    /// already known, i.e. the completion signal should be released now.
    pub(crate) fn record_response(&mut self, success: bool) -> bool {
        if self.is_terminal() {
            return false;
        }

        self.success = success;
        self.phase = match self.phase {
            OriginatePhase::Pending | OriginatePhase::ResponseSeen => OriginatePhase::ResponseSeen,
            OriginatePhase::ChannelSeen => OriginatePhase::Resolved,
            terminal => terminal,
        };
        self.phase == OriginatePhase::Resolved
    }

    /// Records the discovered destination. Returns `true` when the response
    /// was already seen.
    pub(crate) fn record_destination(&mut self, channel: Channel) -> bool {
        if self.is_terminal() || self.destination.is_some() {
            return false;
        }

        self.destination = Some(channel);
        self.phase = match self.phase {
            OriginatePhase::Pending | OriginatePhase::ChannelSeen => OriginatePhase::ChannelSeen,
            OriginatePhase::ResponseSeen => OriginatePhase::Resolved,
            terminal => terminal,
        };
        self.phase == OriginatePhase::Resolved
    }

    pub(crate) fn destination_hung_up(&mut self) {
        self.success = false;
        self.destination_gone = true;
        if self.phase != OriginatePhase::Aborted {
            self.phase = OriginatePhase::Resolved;
        }
    }

    pub(crate) fn abort(&mut self) {
        self.success = false;
        self.hungup = true;
        self.phase = OriginatePhase::Aborted;
    }

    /// Returns the destination if nobody has hung it up yet, marking it as
    /// hung up by this operation.
    pub(crate) fn claim_destination_hangup(&mut self) -> Option<Channel> {
        if self.channel_hungup || self.destination_gone {
            return None;
        }
        let destination = self.destination.clone()?;
        self.channel_hungup = true;
        Some(destination)
    }
}

/// Outcome of one origination attempt.
#[derive(Debug, Clone)]
pub struct OriginateResult {
    pub(crate) success: bool,
    pub(crate) channel: Option<Channel>,
    pub(crate) abort_reason: Option<String>,
    pub(crate) channel_hungup: bool,
}

impl OriginateResult {
    pub fn success(&self) -> bool {
        self.success
    }

    /// The destination channel; only present on success.
    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    pub fn abort_reason(&self) -> Option<&str> {
        self.abort_reason.as_deref()
    }

    /// `true` when the destination was hung up because a monitored channel
    /// went away or the attempt was aborted.
    pub fn channel_was_hung_up(&self) -> bool {
        self.channel_hungup
    }
}
