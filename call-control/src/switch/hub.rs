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

//! In-process [`EventFeed`] that fans switch events out to registered listeners.

use crate::observability::events;
use crate::switch::error::FeedError;
use crate::switch::event::{EventKind, SwitchEvent};
use crate::switch::feed::{EventFeed, EventListener, ListenerPriority, ListenerRegistration};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const COMPONENT: &str = "event_hub";

/// Completion latch for every listener of one priority tier of one event.
struct TierGate {
    pending: AtomicUsize,
    done: CancellationToken,
}

/// Counts its tier down when dropped, whether the event was handled or
/// discarded with the queue.
struct TierPass {
    gate: Arc<TierGate>,
}

impl Drop for TierPass {
    fn drop(&mut self) {
        if self.gate.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.gate.done.cancel();
        }
    }
}

struct Delivery {
    event: SwitchEvent,
    /// Finished once every higher-priority listener handled the event.
    after: Option<CancellationToken>,
    _pass: TierPass,
}

struct HubBinding {
    listener_name: String,
    priority: ListenerPriority,
    interest: HashSet<EventKind>,
    sender: UnboundedSender<Delivery>,
    stop: CancellationToken,
}

/// Each registration owns one queue drained by one task, so a listener never
/// sees two events at once while different listeners progress independently.
///
/// For a single event, a listener is handed the event only after every
/// interested listener of higher priority has finished handling it.
pub struct EventHub {
    next_registration_id: AtomicU64,
    bindings: Mutex<HashMap<u64, HubBinding>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            next_registration_id: AtomicU64::new(1),
            bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Queues `event` for every listener interested in its kind without
    /// waiting for delivery. Returns the number of listeners it was queued for.
    pub async fn dispatch(&self, event: SwitchEvent) -> usize {
        let kind = event.kind();
        let bindings = self.bindings.lock().await;

        let mut targets: Vec<&HubBinding> = bindings
            .values()
            .filter(|binding| binding.interest.contains(&kind))
            .collect();
        targets.sort_by(|lhs, rhs| rhs.priority.cmp(&lhs.priority));

        let mut delivered = 0;
        let mut after: Option<CancellationToken> = None;
        let mut remaining = targets.as_slice();
        while let Some(first) = remaining.first() {
            let tier_len = remaining
                .iter()
                .take_while(|binding| binding.priority == first.priority)
                .count();
            let (tier, rest) = remaining.split_at(tier_len);
            remaining = rest;

            let gate = Arc::new(TierGate {
                pending: AtomicUsize::new(tier.len()),
                done: CancellationToken::new(),
            });
            for binding in tier {
                let delivery = Delivery {
                    event: event.clone(),
                    after: after.clone(),
                    _pass: TierPass { gate: gate.clone() },
                };
                if binding.sender.send(delivery).is_ok() {
                    delivered += 1;
                }
            }
            after = Some(gate.done.clone());
        }

        debug!(
            event = events::HUB_DISPATCH,
            component = COMPONENT,
            kind = ?kind,
            delivered,
            "dispatched switch event"
        );

        delivered
    }

    pub async fn listener_count(&self) -> usize {
        self.bindings.lock().await.len()
    }

    async fn drain(
        listener: Arc<dyn EventListener>,
        mut receiver: UnboundedReceiver<Delivery>,
        stop: CancellationToken,
    ) {
        loop {
            let delivery = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                next = receiver.recv() => match next {
                    Some(delivery) => delivery,
                    None => break,
                },
            };

            let Delivery { event, after, _pass: pass } = delivery;
            if let Some(after) = after {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    _ = after.cancelled() => {}
                }
            }
            listener.on_event(event).await;
            drop(pass);
        }

        debug!(
            event = events::HUB_DELIVERY_STOPPED,
            component = COMPONENT,
            listener = listener.name(),
            "listener delivery stopped"
        );
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventFeed for EventHub {
    async fn register_listener(
        &self,
        listener: Arc<dyn EventListener>,
    ) -> Result<ListenerRegistration, FeedError> {
        let id = self.next_registration_id.fetch_add(1, Ordering::Relaxed);
        let registration = ListenerRegistration::new(id, listener.name());
        let (sender, receiver) = mpsc::unbounded_channel();
        let stop = CancellationToken::new();

        self.bindings.lock().await.insert(
            id,
            HubBinding {
                listener_name: listener.name().to_string(),
                priority: listener.priority(),
                interest: listener.required_events(),
                sender,
                stop: stop.clone(),
            },
        );

        debug!(
            event = events::HUB_LISTENER_REGISTERED,
            component = COMPONENT,
            listener = listener.name(),
            registration_id = id,
            "listener registered"
        );

        tokio::spawn(Self::drain(listener, receiver, stop));

        Ok(registration)
    }

    async fn unregister_listener(
        &self,
        registration: &ListenerRegistration,
    ) -> Result<(), FeedError> {
        let Some(binding) = self.bindings.lock().await.remove(&registration.id()) else {
            warn!(
                event = events::HUB_LISTENER_UNKNOWN,
                component = COMPONENT,
                listener = registration.listener_name(),
                registration_id = registration.id(),
                "unregister for unknown listener"
            );
            return Err(FeedError::UnknownRegistration {
                listener: registration.listener_name().to_string(),
            });
        };

        binding.stop.cancel();
        debug!(
            event = events::HUB_LISTENER_UNREGISTERED,
            component = COMPONENT,
            listener = binding.listener_name.as_str(),
            registration_id = registration.id(),
            "listener unregistered"
        );

        Ok(())
    }
}
