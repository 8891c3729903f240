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

use crate::correlation::discovery::{self, inheritable_token_variable, tokens_match};
use crate::correlation::signal::CompletionSignal;
use crate::correlation::state::{OriginatePhase, OriginateResult, OriginateState};
use crate::model::{CallerId, Channel, EndPoint};
use crate::observability::events;
use crate::observability::fields::{
    format_optional_channel, REASON_ABORTED, REASON_DESTINATION_HUNGUP, REASON_MONITOR_HUNGUP,
};
use crate::retry::RetryOutcome;
use crate::switch::{
    Action, EventFeed, EventKind, EventListener, FeedError, ListenerRegistration,
    OriginateAction, OriginateResponseEvent, SwitchActions, SwitchContext, SwitchEvent,
    CALLING_PRES_PROHIBITED,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "originate";

/// Used when neither the request nor the settings yield a usable dial timeout.
pub const FALLBACK_DIAL_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Slack on top of the dial timeout before the caller stops waiting for the
/// switch.
pub const COMPLETION_GRACE: Duration = Duration::from_millis(1000);

const ORIGINATE_PRIORITY: u32 = 1;
const LOCAL_ORIGINATE_OPTION: &str = "/n";

/// Told about the destination channel as soon as it is discovered, before the
/// origination itself completes.
pub trait NewChannelListener: Send + Sync {
    fn channel_update(&self, channel: &Channel);
}

/// What to dial and how.
#[derive(Debug, Clone)]
pub struct OriginateRequest {
    pub local: EndPoint,
    pub target: EndPoint,
    pub context: String,
    pub variables: HashMap<String, String>,
    pub caller_id: Option<CallerId>,
    pub hide_caller_id: bool,
    /// Overrides the configured dial timeout.
    pub timeout: Option<Duration>,
}

impl OriginateRequest {
    pub fn new(local: EndPoint, target: EndPoint, context: &str) -> Self {
        Self {
            local,
            target,
            context: context.to_string(),
            variables: HashMap::new(),
            caller_id: None,
            hide_caller_id: false,
            timeout: None,
        }
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        self.variables.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_caller_id(mut self, caller_id: CallerId) -> Self {
        self.caller_id = Some(caller_id);
        self
    }

    pub fn hiding_caller_id(mut self) -> Self {
        self.hide_caller_id = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Channels whose hangup cancels the attempt, and who to tell about the
/// destination once it is known.
#[derive(Clone, Default)]
pub struct OriginateOptions {
    pub monitor1: Option<Channel>,
    pub monitor2: Option<Channel>,
    pub listener: Option<Arc<dyn NewChannelListener>>,
}

struct OriginateInner {
    context: SwitchContext,
    monitor1: Option<Channel>,
    monitor2: Option<Channel>,
    listener: Option<Arc<dyn NewChannelListener>>,
    state: tokio::sync::Mutex<OriginateState>,
    signal: CompletionSignal,
    registration: Mutex<Option<ListenerRegistration>>,
    discovery_cancel: CancellationToken,
}

/// One origination attempt correlated with the switch's event stream.
///
/// The operation registers for switch events when it is built and releases
/// that registration once the attempt completes, is aborted, or is refused.
/// Dropping an unfinished `originate` future, or the last handle, releases it
/// as well. An operation dials at most once.
#[derive(Clone)]
pub struct Originate {
    inner: Arc<OriginateInner>,
}

/// The feed keeps the listener alive, so it must not keep the operation alive.
struct OriginateEventListener {
    inner: Weak<OriginateInner>,
}

/// Releases the registration if `originate` is dropped before it finishes.
struct ReleaseOnDrop<'a> {
    inner: &'a OriginateInner,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.inner.release_detached();
    }
}

impl Originate {
    pub async fn new(context: SwitchContext, options: OriginateOptions) -> Result<Self, FeedError> {
        let inner = Arc::new(OriginateInner {
            context,
            monitor1: options.monitor1,
            monitor2: options.monitor2,
            listener: options.listener,
            state: tokio::sync::Mutex::new(OriginateState::new()),
            signal: CompletionSignal::new(),
            registration: Mutex::new(None),
            discovery_cancel: CancellationToken::new(),
        });

        let listener = Arc::new(OriginateEventListener {
            inner: Arc::downgrade(&inner),
        });
        let registration = inner.context.feed.register_listener(listener).await?;
        *inner
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(registration);

        Ok(Self { inner })
    }

    /// Dials `request.target` and waits until the switch has both accepted the
    /// call and revealed its channel, a relevant hangup settles it, the
    /// attempt is aborted, or the dial timeout plus [`COMPLETION_GRACE`]
    /// passes.
    ///
    /// Returns `None` without dialing when a monitored channel already hung
    /// up, the attempt was aborted, or this operation already dialed.
    pub async fn originate(&self, request: OriginateRequest) -> Option<OriginateResult> {
        let inner = &self.inner;

        let token = {
            let mut state = inner.state.lock().await;
            if state.hungup || inner.signal.is_aborted() || inner.is_closed() {
                drop(state);
                info!(
                    event = events::ORIGINATE_SKIPPED_HUNGUP,
                    component = COMPONENT,
                    target = %request.target,
                    "not dialing, operation already hung up or finished"
                );
                inner.close().await;
                return None;
            }

            let token = Uuid::new_v4().to_string();
            state.token = Some(token.clone());
            token
        };

        let _release = ReleaseOnDrop { inner };
        let timeout = inner.effective_timeout(request.timeout);
        debug!(
            event = events::ORIGINATE_START,
            component = COMPONENT,
            local = %request.local,
            target = %request.target,
            context = %request.context,
            token = %token,
            timeout_ms = timeout.as_millis() as u64,
            "dialing"
        );

        let action = build_action(&request, &token, timeout);
        let accepted = match inner
            .context
            .transport
            .send_action(Action::Originate(action), timeout)
            .await
        {
            Ok(response) if response.is_success() => {
                if !inner.signal.wait(timeout + COMPLETION_GRACE).await {
                    debug!(
                        event = events::ORIGINATE_WAIT_EXPIRED,
                        component = COMPONENT,
                        token = %token,
                        "gave up waiting for the switch, using the state seen so far"
                    );
                }
                true
            }
            Ok(response) => {
                error!(
                    event = events::ORIGINATE_REJECTED,
                    component = COMPONENT,
                    target = %request.target,
                    message = response.message.as_deref().unwrap_or_default(),
                    "switch refused the originate action"
                );
                false
            }
            Err(err) => {
                error!(
                    event = events::ORIGINATE_SEND_FAILED,
                    component = COMPONENT,
                    target = %request.target,
                    err = %err,
                    "failed to send the originate action"
                );
                false
            }
        };

        inner.close().await;
        Some(inner.finish(accepted, &request).await)
    }

    /// Cancels the attempt: the waiting caller is released at once and the
    /// destination, if already known, is hung up.
    pub async fn abort(&self, reason: &str) {
        let inner = &self.inner;
        info!(
            event = events::ORIGINATE_ABORT,
            component = COMPONENT,
            reason,
            "aborting origination"
        );

        inner.signal.abort(reason);
        inner.close().await;

        let destination = {
            let mut state = inner.state.lock().await;
            state.abort();
            state.claim_destination_hangup()
        };

        if let Some(destination) = destination {
            inner.hangup_quietly(&destination, REASON_ABORTED).await;
        }
    }

    /// The token the current attempt tagged its channels with.
    pub async fn correlation_token(&self) -> Option<String> {
        self.inner.state.lock().await.token.clone()
    }

    pub async fn phase(&self) -> OriginatePhase {
        self.inner.state.lock().await.phase
    }

    /// `true` while the operation still receives switch events.
    pub fn is_listening(&self) -> bool {
        !self.inner.is_closed()
    }

    /// How often the completion signal has been released; never above one.
    pub fn completion_count(&self) -> u32 {
        self.inner.signal.fire_count()
    }
}

fn build_action(request: &OriginateRequest, token: &str, timeout: Duration) -> OriginateAction {
    let mut variables = request.variables.clone();
    variables.insert(inheritable_token_variable(), token.to_string());

    let (caller_id, calling_pres) = if request.hide_caller_id {
        (None, Some(CALLING_PRES_PROHIBITED))
    } else {
        (request.caller_id.clone(), None)
    };

    OriginateAction {
        action_id: token.to_string(),
        endpoint: request.local.clone(),
        option: request
            .local
            .is_local()
            .then(|| LOCAL_ORIGINATE_OPTION.to_string()),
        context: request.context.clone(),
        exten: request.target.clone(),
        priority: ORIGINATE_PRIORITY,
        caller_id,
        calling_pres,
        variables,
        is_async: true,
        timeout,
    }
}

async fn release_registration(feed: &dyn EventFeed, registration: ListenerRegistration) {
    if let Err(err) = feed.unregister_listener(&registration).await {
        warn!(
            event = events::REGISTRATION_RELEASE_FAILED,
            component = COMPONENT,
            registration_id = registration.id(),
            err = %err,
            "failed to release event registration"
        );
    }
}

impl OriginateInner {
    fn is_closed(&self) -> bool {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn take_registration(&self) -> Option<ListenerRegistration> {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Stops discovery and gives the feed registration back. Safe to call more
    /// than once.
    async fn close(&self) {
        self.discovery_cancel.cancel();

        if let Some(registration) = self.take_registration() {
            release_registration(self.context.feed.as_ref(), registration).await;
        }
    }

    /// [`close`](Self::close) for paths that cannot await: the unregister runs
    /// on a spawned task.
    fn release_detached(&self) {
        self.discovery_cancel.cancel();

        let Some(registration) = self.take_registration() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let feed = self.context.feed.clone();
                runtime.spawn(async move {
                    release_registration(feed.as_ref(), registration).await;
                });
            }
            Err(err) => warn!(
                event = events::REGISTRATION_RELEASE_FAILED,
                component = COMPONENT,
                registration_id = registration.id(),
                err = %err,
                "no runtime left to release event registration on"
            ),
        }
    }

    fn effective_timeout(&self, explicit: Option<Duration>) -> Duration {
        if let Some(timeout) = explicit {
            return timeout;
        }

        match self.context.settings.dial_timeout() {
            Ok(timeout) => timeout,
            Err(err) => {
                error!(
                    event = events::ORIGINATE_TIMEOUT_FALLBACK,
                    component = COMPONENT,
                    err = %err,
                    fallback_ms = FALLBACK_DIAL_TIMEOUT.as_millis() as u64,
                    "configured dial timeout unusable, using fallback"
                );
                FALLBACK_DIAL_TIMEOUT
            }
        }
    }

    async fn finish(&self, accepted: bool, request: &OriginateRequest) -> OriginateResult {
        let (success, destination, cleanup, channel_hungup) = {
            let mut state = self.state.lock().await;
            let aborted = self.signal.is_aborted();
            let success = accepted && state.success && !aborted;
            let destination = state.destination.clone();
            // An abort may release the caller before it got to hang up.
            let cleanup = match (success, aborted) {
                (true, _) => None,
                (false, true) => state.claim_destination_hangup(),
                (false, false) if state.channel_hungup || state.destination_gone => None,
                (false, false) => destination.clone(),
            };
            (success, destination, cleanup, state.channel_hungup)
        };
        let abort_reason = self.signal.abort_reason();

        if success {
            info!(
                event = events::ORIGINATE_OK,
                component = COMPONENT,
                target = %request.target,
                channel = %format_optional_channel(destination.as_ref()),
                "origination succeeded"
            );
            return OriginateResult {
                success,
                channel: destination,
                abort_reason,
                channel_hungup,
            };
        }

        error!(
            event = events::ORIGINATE_FAILED,
            component = COMPONENT,
            target = %request.target,
            channel = %format_optional_channel(destination.as_ref()),
            abort_reason = abort_reason.as_deref().unwrap_or_default(),
            "origination failed"
        );
        if let Some(destination) = cleanup {
            self.hangup_quietly(&destination, "originate_failed").await;
        }

        OriginateResult {
            success,
            channel: None,
            abort_reason,
            channel_hungup,
        }
    }

    async fn hangup_quietly(&self, channel: &Channel, reason: &str) {
        if let Err(err) = self.context.transport.hangup(channel).await {
            warn!(
                event = events::CLEANUP_HANGUP_FAILED,
                component = COMPONENT,
                channel = %channel,
                reason,
                err = %err,
                "failed to hang up channel"
            );
        }
    }

    fn is_monitored(&self, channel: &Channel) -> bool {
        [self.monitor1.as_ref(), self.monitor2.as_ref()]
            .into_iter()
            .flatten()
            .any(|monitored| monitored.is_same(channel))
    }

    async fn handle_event(&self, event: SwitchEvent) {
        let mut state = self.state.lock().await;

        match &event {
            SwitchEvent::Hangup(hangup) => self.on_hangup(&mut state, &hangup.channel).await,
            SwitchEvent::OriginateResponse(response) => self.on_response(&mut state, response),
            SwitchEvent::NewChannel(_) | SwitchEvent::Bridge(_) => {
                if let Some(candidate) = discovery::candidate(&event) {
                    self.on_candidate(&mut state, candidate).await;
                }
            }
        }
    }

    async fn on_hangup(&self, state: &mut OriginateState, channel: &Channel) {
        let is_destination = state
            .destination
            .as_ref()
            .is_some_and(|destination| destination.is_same(channel));

        if is_destination {
            error!(
                event = events::DESTINATION_HANGUP,
                component = COMPONENT,
                channel = %channel,
                reason = REASON_DESTINATION_HUNGUP,
                "destination hung up before origination completed"
            );
            state.destination_hung_up();
            self.signal.fire();
        }

        if self.is_monitored(channel) {
            debug!(
                event = events::MONITOR_HANGUP,
                component = COMPONENT,
                channel = %channel,
                destination = %format_optional_channel(state.destination.as_ref()),
                reason = REASON_MONITOR_HUNGUP,
                "monitored channel hung up, cancelling origination"
            );
            state.abort();
            if let Some(destination) = state.claim_destination_hangup() {
                self.hangup_quietly(&destination, REASON_MONITOR_HUNGUP).await;
            }
            self.signal.fire();
        }
    }

    fn on_response(&self, state: &mut OriginateState, response: &OriginateResponseEvent) {
        let Some(token) = state.token.as_deref() else {
            debug!(
                event = events::ORIGINATE_TOKEN_UNSET,
                component = COMPONENT,
                action_id = %response.action_id,
                "originate response before dialing"
            );
            return;
        };

        if !tokens_match(token, &response.action_id) {
            debug!(
                event = events::ORIGINATE_RESPONSE_FOREIGN,
                component = COMPONENT,
                action_id = %response.action_id,
                "originate response for another operation"
            );
            return;
        }

        let release = state.record_response(response.is_success());
        debug!(
            event = events::ORIGINATE_RESPONSE_MATCHED,
            component = COMPONENT,
            success = response.is_success(),
            channel = %format_optional_channel(state.destination.as_ref()),
            phase = ?state.phase,
            "originate response received"
        );
        if release {
            self.signal.fire();
        }
    }

    async fn on_candidate(&self, state: &mut OriginateState, candidate: &Channel) {
        let skip_reason = if candidate.is_local() {
            Some("local_channel")
        } else if state.is_terminal() {
            Some("settled")
        } else if state.destination.is_some() {
            Some("destination_known")
        } else if state.token.is_none() {
            Some("token_unset")
        } else {
            None
        };

        if let Some(skip_reason) = skip_reason {
            debug!(
                event = events::DISCOVERY_CANDIDATE_SKIPPED,
                component = COMPONENT,
                channel = %candidate,
                skip_reason,
                "not checking channel"
            );
            return;
        }

        let outcome = discovery::lookup_token(
            self.context.transport.as_ref(),
            candidate,
            &self.discovery_cancel,
        )
        .await;

        match outcome {
            RetryOutcome::Ready { value, attempts } => {
                let ours = state
                    .token
                    .as_deref()
                    .is_some_and(|token| tokens_match(token, &value));
                if !ours {
                    debug!(
                        event = events::DISCOVERY_FOREIGN_TOKEN,
                        component = COMPONENT,
                        channel = %candidate,
                        "channel belongs to another operation"
                    );
                    return;
                }

                let release = state.record_destination(candidate.clone());
                debug!(
                    event = events::DISCOVERY_CHANNEL_MATCHED,
                    component = COMPONENT,
                    channel = %candidate,
                    attempts,
                    phase = ?state.phase,
                    "destination channel identified"
                );
                if let Some(listener) = &self.listener {
                    listener.channel_update(candidate);
                }
                if release {
                    self.signal.fire();
                }
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                if !state.success {
                    warn!(
                        event = events::DISCOVERY_LOOKUP_EXHAUSTED,
                        component = COMPONENT,
                        channel = %candidate,
                        attempts,
                        last_error = %last_error
                            .map(|err| err.to_string())
                            .unwrap_or_default(),
                        "could not read correlation token from channel"
                    );
                }
            }
            RetryOutcome::Cancelled { .. } => {}
        }
    }
}

impl Drop for OriginateInner {
    fn drop(&mut self) {
        self.release_detached();
    }
}

#[async_trait]
impl EventListener for OriginateEventListener {
    fn name(&self) -> &str {
        COMPONENT
    }

    fn required_events(&self) -> HashSet<EventKind> {
        HashSet::from([
            EventKind::NewChannel,
            EventKind::Bridge,
            EventKind::Hangup,
            EventKind::OriginateResponse,
        ])
    }

    async fn on_event(&self, event: SwitchEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.handle_event(event).await;
        }
    }
}
