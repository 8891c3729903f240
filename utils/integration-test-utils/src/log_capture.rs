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


use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const EVENT_FIELD: &str = "event";

/// Records the `event` field of every log line emitted on the current thread.
#[derive(Clone, Default)]
pub struct LoggedEvents {
    names: Arc<Mutex<Vec<String>>>,
}

impl LoggedEvents {
    /// Installs a capturing subscriber as the thread default until the guard
    /// drops. Tasks of a current-thread runtime log into it as well.
    pub fn capture() -> (Self, DefaultGuard) {
        let logged = Self::default();
        let guard = tracing_subscriber::registry()
            .with(logged.clone())
            .set_default();
        (logged, guard)
    }

    pub fn names(&self) -> Vec<String> {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.names().iter().filter(|name| *name == event).count()
    }
}

struct EventNameVisitor {
    name: Option<String>,
}

impl Visit for EventNameVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == EVENT_FIELD {
            self.name = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == EVENT_FIELD && self.name.is_none() {
            self.name = Some(format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for LoggedEvents
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventNameVisitor { name: None };
        event.record(&mut visitor);

        if let Some(name) = visitor.name {
            self.names
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(name);
        }
    }
}
