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

use crate::activity::{spawn_activity, Activity, ActivityCallback};
use crate::model::{Call, Channel};
use crate::observability::events;
use crate::observability::fields::format_channels;
use crate::retry::{poll_until, RetryPolicy};
use crate::split::error::SplitError;
use crate::split::hold::HoldActivityAction;
use crate::switch::{Action, RedirectAction, SwitchActions, SwitchContext};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const COMPONENT: &str = "split";

pub const QUIESCENCE_TIMEOUT: Duration = Duration::from_millis(3000);
pub const REDIRECT_TIMEOUT: Duration = Duration::from_millis(1000);
pub const HOLD_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const HOLD_TIMEOUT: Duration = Duration::from_millis(1000);

/// Channel variable tagged with each channel's identity before the split.
pub const PROXY_ID_VARIABLE: &str = "proxyId";

/// Splits a two-channel call into two single-channel calls by parking both
/// channels at the holding extension with one redirect.
pub struct SplitActivity {
    context: SwitchContext,
    call: Call,
    started: AtomicBool,
    outcome: Mutex<Option<Result<(Call, Call), SplitError>>>,
}

impl SplitActivity {
    pub fn new(context: SwitchContext, call: Call) -> Self {
        Self {
            context,
            call,
            started: AtomicBool::new(false),
            outcome: Mutex::new(None),
        }
    }

    /// Builds the activity and runs it to completion.
    pub async fn start(context: SwitchContext, call: Call) -> Self {
        let activity = Self::new(context, call);
        activity.run().await;
        activity
    }

    /// Runs the split on its own task, reporting progress to `callback`.
    pub fn spawn(
        context: SwitchContext,
        call: Call,
        callback: Option<Arc<dyn ActivityCallback>>,
    ) -> (Arc<Self>, JoinHandle<bool>) {
        let activity = Arc::new(Self::new(context, call));
        let handle = spawn_activity(activity.clone(), callback);
        (activity, handle)
    }

    pub fn success(&self) -> bool {
        matches!(self.lock_outcome().as_ref(), Some(Ok(_)))
    }

    /// The call now owning the first channel; `None` unless the split
    /// succeeded.
    pub fn lhs_call(&self) -> Option<Call> {
        match self.lock_outcome().as_ref() {
            Some(Ok((lhs, _))) => Some(lhs.clone()),
            _ => None,
        }
    }

    /// The call now owning the second channel; `None` unless the split
    /// succeeded.
    pub fn rhs_call(&self) -> Option<Call> {
        match self.lock_outcome().as_ref() {
            Some(Ok((_, rhs))) => Some(rhs.clone()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<SplitError> {
        match self.lock_outcome().as_ref() {
            Some(Err(err)) => Some(err.clone()),
            _ => None,
        }
    }

    /// The call as handed in, for diagnostics. Once the split succeeded its
    /// grouping is stale: [`lhs_call`](Self::lhs_call) and
    /// [`rhs_call`](Self::rhs_call) own the channels.
    pub fn original_call(&self) -> &Call {
        &self.call
    }

    fn lock_outcome(&self) -> std::sync::MutexGuard<'_, Option<Result<(Call, Call), SplitError>>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn split(&self) -> Result<(Call, Call), SplitError> {
        let (lhs, rhs) = match self.call.channels() {
            [lhs, rhs] => (lhs, rhs),
            channels => {
                return Err(SplitError::NotTwoChannels {
                    count: channels.len(),
                })
            }
        };

        if lhs.is_same(rhs) {
            return Err(SplitError::SameChannel {
                channel: lhs.name().to_string(),
            });
        }

        let channels = [lhs.clone(), rhs.clone()];
        if !self
            .context
            .transport
            .wait_for_channels_to_quiesce(&channels, QUIESCENCE_TIMEOUT)
            .await
        {
            error!(
                event = events::SPLIT_QUIESCENCE_FAILED,
                component = COMPONENT,
                channels = %format_channels(&channels),
                "quiescence wait failed"
            );
            return Err(SplitError::ChannelsInTransition);
        }

        for channel in &channels {
            let identity = channel.identity().to_string();
            if let Err(err) = self
                .context
                .transport
                .set_variable(channel, PROXY_ID_VARIABLE, &identity)
                .await
            {
                error!(
                    event = events::SPLIT_TAG_FAILED,
                    component = COMPONENT,
                    channel = %channel,
                    err = %err,
                    "failed to tag channel before split"
                );
                return Err(SplitError::TagFailed(err));
            }
        }

        let holds = channels
            .iter()
            .map(|channel| {
                let hold = Arc::new(HoldActivityAction::new());
                channel.set_current_activity_action(hold.clone());
                (channel, hold)
            })
            .collect::<Vec<_>>();

        self.redirect_to_holding(lhs, rhs).await?;

        let cancel = CancellationToken::new();
        let all_holding = poll_until(
            RetryPolicy::within(HOLD_POLL_INTERVAL, HOLD_TIMEOUT),
            &cancel,
            |attempt| {
                let mut all_holding = true;
                for (channel, hold) in &holds {
                    if !hold.has_reached_hold() {
                        all_holding = false;
                        warn!(
                            event = events::SPLIT_WAITING_ON_CHANNEL,
                            component = COMPONENT,
                            channel = %channel,
                            attempt,
                            "waiting for channel to reach holding"
                        );
                    }
                }
                async move { all_holding }
            },
        )
        .await;

        if !all_holding {
            let channels = holds
                .iter()
                .filter(|(_, hold)| !hold.has_reached_hold())
                .map(|(channel, _)| channel.name().to_string())
                .collect();
            return Err(SplitError::HoldNotReached { channels });
        }

        let lhs_call = self.call.split(lhs).map_err(SplitError::Regroup)?;
        let rhs_call = self.call.split(rhs).map_err(SplitError::Regroup)?;
        Ok((lhs_call, rhs_call))
    }

    async fn redirect_to_holding(&self, lhs: &Channel, rhs: &Channel) -> Result<(), SplitError> {
        let settings = &self.context.settings;
        let redirect = RedirectAction::new(
            lhs.clone(),
            &settings.management_context,
            &settings.holding_extension,
            settings.holding_priority,
        )
        .with_extra_channel(
            rhs.clone(),
            &settings.management_context,
            &settings.holding_extension,
            settings.holding_priority,
        );

        match self
            .context
            .transport
            .send_action(Action::Redirect(redirect), REDIRECT_TIMEOUT)
            .await
        {
            Ok(response) if response.is_success() => Ok(()),
            // Arrival polling decides; some switches reject the extra leg yet
            // still move both channels.
            Ok(response) => {
                warn!(
                    event = events::SPLIT_REDIRECT_REJECTED,
                    component = COMPONENT,
                    lhs = %lhs,
                    rhs = %rhs,
                    message = response.message.as_deref().unwrap_or_default(),
                    "redirect to holding not acknowledged"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    event = events::SPLIT_REDIRECT_FAILED,
                    component = COMPONENT,
                    lhs = %lhs,
                    rhs = %rhs,
                    err = %err,
                    "failed to redirect channels to holding"
                );
                Err(SplitError::RedirectFailed(err))
            }
        }
    }
}

#[async_trait]
impl Activity for SplitActivity {
    fn name(&self) -> &str {
        COMPONENT
    }

    /// Runs once; later calls report the first run's outcome.
    async fn run(&self) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            return self.success();
        }

        info!(
            event = events::SPLIT_START,
            component = COMPONENT,
            call_id = self.call.id(),
            channels = %format_channels(self.call.channels()),
            "splitting call"
        );

        let outcome = self.split().await;
        match &outcome {
            Ok((lhs, rhs)) => info!(
                event = events::SPLIT_OK,
                component = COMPONENT,
                call_id = self.call.id(),
                lhs_call_id = lhs.id(),
                rhs_call_id = rhs.id(),
                "call split"
            ),
            Err(err @ (SplitError::NotTwoChannels { .. } | SplitError::SameChannel { .. })) => {
                error!(
                    event = events::SPLIT_PRECONDITION_FAILED,
                    component = COMPONENT,
                    call_id = self.call.id(),
                    err = %err,
                    "refusing to split call"
                )
            }
            Err(err) => error!(
                event = events::SPLIT_FAILED,
                component = COMPONENT,
                call_id = self.call.id(),
                err = %err,
                "call split failed"
            ),
        }

        let success = outcome.is_ok();
        *self.lock_outcome() = Some(outcome);
        success
    }
}
