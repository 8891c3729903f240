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

//! Destination discovery: which channel an event is about, and whether it
//! carries our correlation token.

use crate::model::Channel;
use crate::retry::{retry, RetryOutcome, RetryPolicy};
use crate::switch::{SwitchActions, SwitchError, SwitchEvent, SwitchTransport};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Channel variable carrying the correlation token.
pub const ORIGINATE_ID_VARIABLE: &str = "njrOriginateID";

/// Prefix that makes the switch copy a variable onto descendant channels.
pub const INHERITABLE_VARIABLE_PREFIX: &str = "__";

pub(crate) const LOOKUP_ATTEMPTS: u32 = 5;
pub(crate) const LOOKUP_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) fn inheritable_token_variable() -> String {
    format!("{INHERITABLE_VARIABLE_PREFIX}{ORIGINATE_ID_VARIABLE}")
}

/// The channel a new-channel or bridge event may have created for us. For a
/// bridge this is the first side that is not a local/internal channel.
pub(crate) fn candidate(event: &SwitchEvent) -> Option<&Channel> {
    match event {
        SwitchEvent::NewChannel(new_channel) => Some(&new_channel.channel),
        SwitchEvent::Bridge(bridge) if bridge.channel1.is_local() => Some(&bridge.channel2),
        SwitchEvent::Bridge(bridge) => Some(&bridge.channel1),
        SwitchEvent::Hangup(_) | SwitchEvent::OriginateResponse(_) => None,
    }
}

pub(crate) fn tokens_match(lhs: &str, rhs: &str) -> bool {
    lhs.eq_ignore_ascii_case(rhs)
}

/// The switch copies inherited variables shortly after it announces a channel,
/// so an unset value or a not-found error is retried a few times.
pub(crate) async fn lookup_token(
    transport: &dyn SwitchTransport,
    channel: &Channel,
    cancel: &CancellationToken,
) -> RetryOutcome<String, SwitchError> {
    retry(
        RetryPolicy::attempts(LOOKUP_INTERVAL, LOOKUP_ATTEMPTS),
        cancel,
        |_| transport.get_variable(channel, ORIGINATE_ID_VARIABLE),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::{candidate, inheritable_token_variable, tokens_match};
    use crate::model::Channel;
    use crate::switch::SwitchEvent;

    #[test]
    fn bridge_candidate_skips_local_first_side() {
        let local = Channel::new("Local/200@default-00000001;2", "1");
        let real = Channel::new("SIP/200-00000002", "2");

        let event = SwitchEvent::bridge(local.clone(), real.clone());
        assert!(candidate(&event).is_some_and(|channel| channel.is_same(&real)));

        let event = SwitchEvent::bridge(real.clone(), local);
        assert!(candidate(&event).is_some_and(|channel| channel.is_same(&real)));
    }

    #[test]
    fn hangup_has_no_candidate() {
        let event = SwitchEvent::hangup(Channel::new("SIP/200-00000002", "2"));

        assert!(candidate(&event).is_none());
    }

    #[test]
    fn token_match_is_exact_but_case_insensitive() {
        assert!(tokens_match("A1B2-c3", "a1b2-C3"));
        assert!(!tokens_match("a1b2-c3", "a1b2-c4"));
        assert!(!tokens_match("a1b2", "a1b2-c3"));
    }

    #[test]
    fn inherited_variable_uses_double_underscore() {
        assert_eq!(inheritable_token_variable(), "__njrOriginateID");
    }
}
