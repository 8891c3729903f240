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

use async_trait::async_trait;
use call_control::{Action, ActionResponse, Channel, SwitchError, SwitchTransport};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// How channels behave once they are redirected to the holding extension.
#[derive(Debug, Clone)]
pub enum HoldArrival {
    /// Every redirected channel arrives as part of the redirect.
    Immediate,
    /// Every redirected channel arrives after the delay.
    After(Duration),
    /// Only this channel ever arrives.
    Only(Channel),
    Never,
}

#[derive(Debug, Clone)]
enum ScriptedReply {
    Reject(String),
    Fail(SwitchError),
}

#[derive(Debug, Clone)]
struct ScriptedVariable {
    value: String,
    hidden_lookups: u32,
}

struct SwitchScript {
    replies: HashMap<String, ScriptedReply>,
    variables: HashMap<(u64, String), ScriptedVariable>,
    hold_arrival: HoldArrival,
}

/// In-memory switch for tests.
///
/// Every action is recorded. Replies succeed unless scripted otherwise,
/// channel variables can be made to appear only after a number of lookups,
/// and a redirect makes channels "arrive" at holding by running their current
/// activity action.
pub struct ScriptedSwitch {
    name: String,
    actions: Mutex<Vec<Action>>,
    lookups: Mutex<HashMap<u64, u32>>,
    script: Mutex<SwitchScript>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedSwitch {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            actions: Mutex::new(Vec::new()),
            lookups: Mutex::new(HashMap::new()),
            script: Mutex::new(SwitchScript {
                replies: HashMap::new(),
                variables: HashMap::new(),
                hold_arrival: HoldArrival::Immediate,
            }),
        }
    }

    /// Answers every `action` (by action name, e.g. `"Originate"`) with an
    /// error response carrying `message`.
    pub fn reject_action(&self, action: &str, message: &str) {
        lock(&self.script).replies.insert(
            action.to_string(),
            ScriptedReply::Reject(message.to_string()),
        );
    }

    /// Makes every `action` fail at the transport level.
    pub fn fail_action(&self, action: &str, err: SwitchError) {
        lock(&self.script)
            .replies
            .insert(action.to_string(), ScriptedReply::Fail(err));
    }

    pub fn set_channel_variable(&self, channel: &Channel, variable: &str, value: &str) {
        self.set_channel_variable_after(channel, variable, value, 0);
    }

    /// The first `hidden_lookups` reads of the variable see it unset.
    pub fn set_channel_variable_after(
        &self,
        channel: &Channel,
        variable: &str,
        value: &str,
        hidden_lookups: u32,
    ) {
        lock(&self.script).variables.insert(
            (channel.identity(), variable.to_string()),
            ScriptedVariable {
                value: value.to_string(),
                hidden_lookups,
            },
        );
    }

    pub fn set_hold_arrival(&self, hold_arrival: HoldArrival) {
        lock(&self.script).hold_arrival = hold_arrival;
    }

    /// How many variable lookups were sent for `channel`.
    pub fn lookup_count(&self, channel: &Channel) -> u32 {
        lock(&self.lookups)
            .get(&channel.identity())
            .copied()
            .unwrap_or_default()
    }

    pub fn recorded_actions(&self) -> Vec<Action> {
        lock(&self.actions).clone()
    }

    pub fn count_actions(&self, action: &str) -> usize {
        lock(&self.actions)
            .iter()
            .filter(|recorded| recorded.name() == action)
            .count()
    }

    /// Channels the switch was asked to hang up, in order.
    pub fn hung_up_channels(&self) -> Vec<Channel> {
        lock(&self.actions)
            .iter()
            .filter_map(|recorded| match recorded {
                Action::Hangup { channel } => Some(channel.clone()),
                _ => None,
            })
            .collect()
    }

    fn read_variable(&self, channel: &Channel, variable: &str) -> ActionResponse {
        *lock(&self.lookups).entry(channel.identity()).or_default() += 1;

        let mut script = lock(&self.script);
        match script
            .variables
            .get_mut(&(channel.identity(), variable.to_string()))
        {
            Some(scripted) if scripted.hidden_lookups > 0 => {
                scripted.hidden_lookups -= 1;
                ActionResponse::success()
            }
            Some(scripted) => ActionResponse::success().with_attribute("Value", &scripted.value),
            None => ActionResponse::success(),
        }
    }

    fn arrive_at_holding(&self, channels: Vec<Channel>) {
        let hold_arrival = lock(&self.script).hold_arrival.clone();

        match hold_arrival {
            HoldArrival::Immediate => {
                for channel in &channels {
                    channel.run_current_activity();
                }
            }
            HoldArrival::After(delay) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    for channel in &channels {
                        channel.run_current_activity();
                    }
                });
            }
            HoldArrival::Only(arriving) => {
                for channel in channels.iter().filter(|channel| channel.is_same(&arriving)) {
                    channel.run_current_activity();
                }
            }
            HoldArrival::Never => {}
        }
    }
}

#[async_trait]
impl SwitchTransport for ScriptedSwitch {
    async fn send_action(
        &self,
        action: Action,
        _timeout: Duration,
    ) -> Result<ActionResponse, SwitchError> {
        debug!("{}: received action {}", self.name, action.name());
        lock(&self.actions).push(action.clone());

        let scripted = lock(&self.script).replies.get(action.name()).cloned();
        match scripted {
            Some(ScriptedReply::Fail(err)) => return Err(err),
            Some(ScriptedReply::Reject(message)) => return Ok(ActionResponse::error(&message)),
            None => {}
        }

        let response = match action {
            Action::GetVar { channel, variable } => self.read_variable(&channel, &variable),
            Action::Redirect(redirect) => {
                let channels = std::iter::once(redirect.channel)
                    .chain(redirect.extra_channel)
                    .collect();
                self.arrive_at_holding(channels);
                ActionResponse::success()
            }
            Action::Originate(_) | Action::SetVar { .. } | Action::Hangup { .. } => {
                ActionResponse::success()
            }
        };

        Ok(response)
    }
}
