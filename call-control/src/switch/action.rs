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

//! Control actions sent to the switch and the responses it returns.

use crate::model::{CallerId, Channel, EndPoint};
use std::collections::HashMap;
use std::time::Duration;

const SUCCESS_RESPONSE: &str = "Success";
const ERROR_RESPONSE: &str = "Error";

/// Calling presentation value that withholds the caller id.
pub const CALLING_PRES_PROHIBITED: u32 = 32;

#[derive(Debug, Clone)]
pub enum Action {
    Originate(OriginateAction),
    Redirect(RedirectAction),
    GetVar { channel: Channel, variable: String },
    SetVar {
        channel: Channel,
        variable: String,
        value: String,
    },
    Hangup { channel: Channel },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Originate(_) => "Originate",
            Action::Redirect(_) => "Redirect",
            Action::GetVar { .. } => "Getvar",
            Action::SetVar { .. } => "Setvar",
            Action::Hangup { .. } => "Hangup",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OriginateAction {
    /// Doubles as the correlation token for the resulting events.
    pub action_id: String,
    pub endpoint: EndPoint,
    pub option: Option<String>,
    pub context: String,
    pub exten: EndPoint,
    pub priority: u32,
    pub caller_id: Option<CallerId>,
    pub calling_pres: Option<u32>,
    pub variables: HashMap<String, String>,
    pub is_async: bool,
    pub timeout: Duration,
}

/// Moves `channel` (and optionally `extra_channel`) to a dialplan location in
/// one switch-side operation.
#[derive(Debug, Clone)]
pub struct RedirectAction {
    pub channel: Channel,
    pub context: String,
    pub exten: String,
    pub priority: u32,
    pub extra_channel: Option<Channel>,
    pub extra_context: Option<String>,
    pub extra_exten: Option<String>,
    pub extra_priority: Option<u32>,
}

impl RedirectAction {
    pub fn new(channel: Channel, context: &str, exten: &str, priority: u32) -> Self {
        Self {
            channel,
            context: context.to_string(),
            exten: exten.to_string(),
            priority,
            extra_channel: None,
            extra_context: None,
            extra_exten: None,
            extra_priority: None,
        }
    }

    pub fn with_extra_channel(
        mut self,
        channel: Channel,
        context: &str,
        exten: &str,
        priority: u32,
    ) -> Self {
        self.extra_channel = Some(channel);
        self.extra_context = Some(context.to_string());
        self.extra_exten = Some(exten.to_string());
        self.extra_priority = Some(priority);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionResponse {
    pub response: String,
    pub message: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl ActionResponse {
    pub fn success() -> Self {
        Self {
            response: SUCCESS_RESPONSE.to_string(),
            ..Default::default()
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            response: ERROR_RESPONSE.to_string(),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case(SUCCESS_RESPONSE)
    }

    /// Attribute lookup is case-insensitive on the key, as the switch is not
    /// consistent about header casing.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ActionResponse;

    #[test]
    fn success_match_ignores_case() {
        let response = ActionResponse {
            response: "SUCCESS".to_string(),
            ..Default::default()
        };

        assert!(response.is_success());
        assert!(!ActionResponse::error("No such channel").is_success());
    }

    #[test]
    fn attribute_lookup_ignores_key_case() {
        let response = ActionResponse::success().with_attribute("Value", "abc");

        assert_eq!(response.attribute("value"), Some("abc"));
        assert_eq!(response.attribute("missing"), None);
    }
}
