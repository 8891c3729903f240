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

//! Value-format helpers for structured log fields.

use crate::model::Channel;

pub const NONE: &str = "none";

pub const REASON_DESTINATION_HUNGUP: &str = "destination_hungup";
pub const REASON_MONITOR_HUNGUP: &str = "monitor_hungup";
pub const REASON_ABORTED: &str = "aborted";

pub fn format_optional_channel(channel: Option<&Channel>) -> String {
    channel
        .map(|channel| channel.name().to_string())
        .unwrap_or_else(|| NONE.to_string())
}

pub fn format_channels(channels: &[Channel]) -> String {
    if channels.is_empty() {
        return NONE.to_string();
    }

    channels
        .iter()
        .map(Channel::name)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::{format_channels, format_optional_channel, NONE};
    use crate::model::Channel;

    #[test]
    fn optional_channel_falls_back_to_none() {
        assert_eq!(format_optional_channel(None), NONE);

        let channel = Channel::new("SIP/100-00000001", "1");
        assert_eq!(format_optional_channel(Some(&channel)), "SIP/100-00000001");
    }

    #[test]
    fn channel_list_is_comma_joined() {
        let channels = [
            Channel::new("SIP/100-00000001", "1"),
            Channel::new("SIP/200-00000002", "2"),
        ];

        assert_eq!(format_channels(&channels), "SIP/100-00000001,SIP/200-00000002");
        assert_eq!(format_channels(&[]), NONE);
    }
}
