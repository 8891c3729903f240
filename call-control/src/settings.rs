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

//! Switch profile settings.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

const DEFAULT_DIAL_TIMEOUT_SECS: i64 = 30;
const DEFAULT_MANAGEMENT_CONTEXT: &str = "njr-management";
const DEFAULT_HOLDING_EXTENSION: &str = "agi";
const DEFAULT_HOLDING_PRIORITY: u32 = 1;

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(json5::Error),
    InvalidDialTimeout { value: i64 },
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "unable to read settings: {err}"),
            SettingsError::Parse(err) => write!(f, "unable to parse settings: {err}"),
            SettingsError::InvalidDialTimeout { value } => {
                write!(f, "invalid dial timeout: {value}s")
            }
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            SettingsError::Parse(err) => Some(err),
            SettingsError::InvalidDialTimeout { .. } => None,
        }
    }
}

fn default_dial_timeout_secs() -> i64 {
    DEFAULT_DIAL_TIMEOUT_SECS
}

fn default_management_context() -> String {
    DEFAULT_MANAGEMENT_CONTEXT.to_string()
}

fn default_holding_extension() -> String {
    DEFAULT_HOLDING_EXTENSION.to_string()
}

fn default_holding_priority() -> u32 {
    DEFAULT_HOLDING_PRIORITY
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SwitchSettings {
    /// Default ring time for originate, in seconds.
    #[serde(default = "default_dial_timeout_secs")]
    pub dial_timeout_secs: i64,
    /// Dialplan context that hosts the holding extension.
    #[serde(default = "default_management_context")]
    pub management_context: String,
    /// Extension where split channels park silently.
    #[serde(default = "default_holding_extension")]
    pub holding_extension: String,
    #[serde(default = "default_holding_priority")]
    pub holding_priority: u32,
}

impl Default for SwitchSettings {
    fn default() -> Self {
        Self {
            dial_timeout_secs: DEFAULT_DIAL_TIMEOUT_SECS,
            management_context: default_management_context(),
            holding_extension: default_holding_extension(),
            holding_priority: DEFAULT_HOLDING_PRIORITY,
        }
    }
}

impl SwitchSettings {
    pub fn from_json5(contents: &str) -> Result<Self, SettingsError> {
        json5::from_str(contents).map_err(SettingsError::Parse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_json5(&contents)
    }

    pub fn dial_timeout(&self) -> Result<Duration, SettingsError> {
        let invalid = || SettingsError::InvalidDialTimeout {
            value: self.dial_timeout_secs,
        };

        let secs = u64::try_from(self.dial_timeout_secs).map_err(|_| invalid())?;
        if secs == 0 {
            return Err(invalid());
        }

        secs.checked_mul(1000)
            .map(Duration::from_millis)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::{SettingsError, SwitchSettings};
    use std::time::Duration;

    #[test]
    fn json5_fills_defaults() {
        let settings = SwitchSettings::from_json5("{ dial_timeout_secs: 45, }")
            .expect("settings should parse");

        assert_eq!(settings.dial_timeout_secs, 45);
        assert_eq!(settings.management_context, "njr-management");
        assert_eq!(settings.holding_extension, "agi");
        assert_eq!(settings.holding_priority, 1);
        assert_eq!(
            settings.dial_timeout().expect("valid timeout"),
            Duration::from_secs(45)
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            SwitchSettings::from_json5("{ dial_timeout: 45 }"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn non_positive_dial_timeout_is_invalid() {
        for value in [0, -5] {
            let settings = SwitchSettings {
                dial_timeout_secs: value,
                ..Default::default()
            };

            assert!(matches!(
                settings.dial_timeout(),
                Err(SettingsError::InvalidDialTimeout { value: reported }) if reported == value
            ));
        }
    }

    #[test]
    fn exported_json_is_a_valid_settings_file() {
        let settings = SwitchSettings {
            holding_extension: "park".to_string(),
            ..Default::default()
        };

        let exported = serde_json::to_string_pretty(&settings).expect("settings serialize");

        assert!(exported.contains("\"holding_extension\": \"park\""));
        assert_eq!(
            SwitchSettings::from_json5(&exported).expect("exported settings parse"),
            settings
        );
    }

    #[test]
    fn missing_file_reports_io_error() {
        assert!(matches!(
            SwitchSettings::from_file("/nonexistent/call-control-settings.json5"),
            Err(SettingsError::Io(_))
        ));
    }
}
