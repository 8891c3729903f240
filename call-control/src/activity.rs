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

//! Operation contract and the background runner for activities.

use crate::observability::events;
use crate::switch::{EventKind, ListenerPriority};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

const COMPONENT: &str = "activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityStatus {
    Starting,
    Success,
    Failure,
}

impl Display for ActivityStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ActivityStatus::Starting => "starting",
            ActivityStatus::Success => "success",
            ActivityStatus::Failure => "failure",
        };
        f.write_str(status)
    }
}

/// Observer told when a background activity starts and how it ended.
#[async_trait]
pub trait ActivityCallback: Send + Sync {
    async fn progress(&self, activity: &str, status: ActivityStatus);
}

/// A pluggable call-control operation.
#[async_trait]
pub trait Activity: Send + Sync {
    fn name(&self) -> &str;

    /// Switch events the activity needs while it runs.
    fn required_events(&self) -> HashSet<EventKind> {
        HashSet::new()
    }

    fn priority(&self) -> ListenerPriority {
        ListenerPriority::Normal
    }

    /// Drives the activity to completion; `true` on success.
    async fn run(&self) -> bool;
}

/// Runs `activity` on its own task. The callback, if any, sees
/// [`ActivityStatus::Starting`] first and exactly one terminal status after.
pub fn spawn_activity<A>(
    activity: Arc<A>,
    callback: Option<Arc<dyn ActivityCallback>>,
) -> JoinHandle<bool>
where
    A: Activity + ?Sized + 'static,
{
    tokio::spawn(async move {
        report(activity.name(), ActivityStatus::Starting, callback.as_deref()).await;

        let success = activity.run().await;
        let status = if success {
            ActivityStatus::Success
        } else {
            ActivityStatus::Failure
        };

        report(activity.name(), status, callback.as_deref()).await;
        success
    })
}

async fn report(activity: &str, status: ActivityStatus, callback: Option<&dyn ActivityCallback>) {
    info!(
        event = events::ACTIVITY_STATUS,
        component = COMPONENT,
        activity,
        status = %status,
        "activity progress"
    );

    if let Some(callback) = callback {
        callback.progress(activity, status).await;
    }
}
