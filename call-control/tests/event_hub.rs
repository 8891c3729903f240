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

mod support;

use call_control::correlation::ORIGINATE_ID_VARIABLE;
use call_control::{EventFeed, EventKind, ListenerPriority, Originate, OriginateOptions, SwitchEvent};
use integration_test_utils::{sip_channel, wait_until, RecordingEventListener, SwitchHarness};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[tokio::test(start_paused = true)]
async fn bystander_listeners_outlive_finished_originate() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("bystander");
    let event_store = Arc::new(Mutex::new(Vec::new()));
    let hangups = RecordingEventListener::new(
        "hangups",
        HashSet::from([EventKind::Hangup]),
        ListenerPriority::Low,
        event_store.clone(),
    );
    let channels = RecordingEventListener::new(
        "channels",
        HashSet::from([EventKind::NewChannel, EventKind::Bridge]),
        ListenerPriority::High,
        event_store.clone(),
    );
    harness
        .hub
        .register_listener(Arc::new(hangups.clone()))
        .await
        .expect("registration should succeed");
    harness
        .hub
        .register_listener(Arc::new(channels))
        .await
        .expect("registration should succeed");

    let originate = Originate::new(harness.context.clone(), OriginateOptions::default())
        .await
        .expect("registration should succeed");
    assert_eq!(harness.hub.listener_count().await, 3);

    let handle = support::spawn_originate(&originate, support::request_to("200"));
    let token = support::wait_for_token(&originate).await;
    let destination = sip_channel("200");
    harness
        .switch
        .set_channel_variable(&destination, ORIGINATE_ID_VARIABLE, &token);
    assert_eq!(
        harness
            .hub
            .dispatch(SwitchEvent::new_channel(destination.clone()))
            .await,
        2
    );
    harness
        .hub
        .dispatch(SwitchEvent::originate_response(&token, true))
        .await;
    assert!(support::join_result(handle).await.success());
    assert_eq!(harness.hub.listener_count().await, 2);

    assert_eq!(
        harness
            .hub
            .dispatch(SwitchEvent::hangup(destination))
            .await,
        1
    );
    assert!(
        wait_until(Duration::from_secs(1), || event_store
            .try_lock()
            .map(|events| events.len() == 2)
            .unwrap_or(false))
        .await
    );

    let events = hangups.retrieve_event_store();
    let events = events.lock().await;
    let names: Vec<&str> = events.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["channels", "hangups"]);
    assert_eq!(events[1].1.kind(), EventKind::Hangup);
}
