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

//! Control-action transport seam and the convenience actions built on it.

use crate::model::Channel;
use crate::retry::{poll_until, RetryPolicy};
use crate::switch::action::{Action, ActionResponse};
use crate::switch::error::SwitchError;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const GET_VARIABLE_TIMEOUT: Duration = Duration::from_millis(500);
pub const SET_VARIABLE_TIMEOUT: Duration = Duration::from_millis(1000);
pub const HANGUP_TIMEOUT: Duration = Duration::from_millis(1000);

const QUIESCENCE_POLL_INTERVAL: Duration = Duration::from_millis(100);
const VALUE_ATTRIBUTE: &str = "Value";

/// Sends control actions to the switch.
///
/// `send_action` must give up once `timeout` elapses and report
/// [`SwitchError::Timeout`].
#[async_trait]
pub trait SwitchTransport: Send + Sync {
    async fn send_action(
        &self,
        action: Action,
        timeout: Duration,
    ) -> Result<ActionResponse, SwitchError>;

    /// Waits until none of `channels` is in a transitional state.
    ///
    /// The default polls [`Channel::is_quiescent`]; transports with better
    /// knowledge of channel state may override it.
    async fn wait_for_channels_to_quiesce(&self, channels: &[Channel], timeout: Duration) -> bool {
        let cancel = CancellationToken::new();
        poll_until(
            RetryPolicy::within(QUIESCENCE_POLL_INTERVAL, timeout),
            &cancel,
            |_| {
                let quiescent = channels.iter().all(Channel::is_quiescent);
                async move { quiescent }
            },
        )
        .await
    }
}

#[async_trait]
pub trait SwitchActions {
    async fn hangup(&self, channel: &Channel) -> Result<(), SwitchError>;

    /// `Ok(None)` when the switch answered but the variable is not (yet) set.
    async fn get_variable(
        &self,
        channel: &Channel,
        variable: &str,
    ) -> Result<Option<String>, SwitchError>;

    async fn set_variable(
        &self,
        channel: &Channel,
        variable: &str,
        value: &str,
    ) -> Result<(), SwitchError>;
}

fn require_success(action: &str, response: ActionResponse) -> Result<ActionResponse, SwitchError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(SwitchError::ActionRejected {
            action: action.to_string(),
            message: response.message.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl<T> SwitchActions for T
where
    T: SwitchTransport + ?Sized,
{
    async fn hangup(&self, channel: &Channel) -> Result<(), SwitchError> {
        let action = Action::Hangup {
            channel: channel.clone(),
        };
        let name = action.name();
        let response = self.send_action(action, HANGUP_TIMEOUT).await?;
        require_success(name, response).map(|_| ())
    }

    async fn get_variable(
        &self,
        channel: &Channel,
        variable: &str,
    ) -> Result<Option<String>, SwitchError> {
        let action = Action::GetVar {
            channel: channel.clone(),
            variable: variable.to_string(),
        };
        let name = action.name();
        let response = self.send_action(action, GET_VARIABLE_TIMEOUT).await?;
        let response = require_success(name, response)?;

        Ok(response
            .attribute(VALUE_ATTRIBUTE)
            .filter(|value| !value.is_empty())
            .map(str::to_string))
    }

    async fn set_variable(
        &self,
        channel: &Channel,
        variable: &str,
        value: &str,
    ) -> Result<(), SwitchError> {
        let action = Action::SetVar {
            channel: channel.clone(),
            variable: variable.to_string(),
            value: value.to_string(),
        };
        let name = action.name();
        let response = self.send_action(action, SET_VARIABLE_TIMEOUT).await?;
        require_success(name, response).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::{SwitchActions, SwitchTransport};
    use crate::model::Channel;
    use crate::switch::action::{Action, ActionResponse};
    use crate::switch::error::SwitchError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct VariableTransport {
        value: Option<&'static str>,
    }

    #[async_trait]
    impl SwitchTransport for VariableTransport {
        async fn send_action(
            &self,
            action: Action,
            _timeout: Duration,
        ) -> Result<ActionResponse, SwitchError> {
            match (action, self.value) {
                (Action::GetVar { .. }, Some(value)) => {
                    Ok(ActionResponse::success().with_attribute("Value", value))
                }
                (Action::GetVar { .. }, None) => Ok(ActionResponse::success()),
                _ => Ok(ActionResponse::error("No such channel")),
            }
        }
    }

    #[tokio::test]
    async fn get_variable_reads_value_attribute() {
        let transport = VariableTransport { value: Some("abc") };
        let channel = Channel::new("SIP/100-00000001", "1");

        let value = transport
            .get_variable(&channel, "njrOriginateID")
            .await
            .expect("lookup should succeed");

        assert_eq!(value.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn get_variable_treats_empty_value_as_unset() {
        let transport = VariableTransport { value: Some("") };
        let channel = Channel::new("SIP/100-00000001", "1");

        assert_eq!(
            transport.get_variable(&channel, "njrOriginateID").await,
            Ok(None)
        );
    }

    #[tokio::test]
    async fn rejected_hangup_surfaces_switch_message() {
        let transport = VariableTransport { value: None };
        let channel = Channel::new("SIP/100-00000001", "1");

        assert_eq!(
            transport.hangup(&channel).await,
            Err(SwitchError::ActionRejected {
                action: "Hangup".to_string(),
                message: "No such channel".to_string(),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn default_quiescence_wait_sees_late_settle() {
        let transport = VariableTransport { value: None };
        let channel = Channel::new("SIP/100-00000001", "1");
        channel.set_in_transition(true);

        let settling = channel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            settling.set_in_transition(false);
        });

        assert!(
            transport
                .wait_for_channels_to_quiesce(&[channel], Duration::from_millis(3000))
                .await
        );
    }
}
