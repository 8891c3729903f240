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

//! Asynchronous notification events pushed by the switch.

use crate::model::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewChannel,
    Bridge,
    Hangup,
    OriginateResponse,
}

#[derive(Debug, Clone)]
pub struct NewChannelEvent {
    pub channel: Channel,
    pub context: Option<String>,
    pub state: String,
}

/// Two channels were linked (or unlinked). Older switches report link and
/// unlink separately; both are folded into this event.
#[derive(Debug, Clone)]
pub struct BridgeEvent {
    pub channel1: Channel,
    pub channel2: Channel,
    pub linked: bool,
}

#[derive(Debug, Clone)]
pub struct HangupEvent {
    pub channel: Channel,
    pub cause: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct OriginateResponseEvent {
    pub action_id: String,
    pub response: String,
    pub reason: Option<u32>,
    pub channel: Option<String>,
}

impl OriginateResponseEvent {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("Success")
    }
}

#[derive(Debug, Clone)]
pub enum SwitchEvent {
    NewChannel(NewChannelEvent),
    Bridge(BridgeEvent),
    Hangup(HangupEvent),
    OriginateResponse(OriginateResponseEvent),
}

impl SwitchEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SwitchEvent::NewChannel(_) => EventKind::NewChannel,
            SwitchEvent::Bridge(_) => EventKind::Bridge,
            SwitchEvent::Hangup(_) => EventKind::Hangup,
            SwitchEvent::OriginateResponse(_) => EventKind::OriginateResponse,
        }
    }

    pub fn new_channel(channel: Channel) -> Self {
        SwitchEvent::NewChannel(NewChannelEvent {
            channel,
            context: None,
            state: "Down".to_string(),
        })
    }

    pub fn bridge(channel1: Channel, channel2: Channel) -> Self {
        SwitchEvent::Bridge(BridgeEvent {
            channel1,
            channel2,
            linked: true,
        })
    }

    pub fn hangup(channel: Channel) -> Self {
        SwitchEvent::Hangup(HangupEvent {
            channel,
            cause: None,
        })
    }

    pub fn originate_response(action_id: &str, success: bool) -> Self {
        SwitchEvent::OriginateResponse(OriginateResponseEvent {
            action_id: action_id.to_string(),
            response: if success { "Success" } else { "Failure" }.to_string(),
            reason: None,
            channel: None,
        })
    }
}
