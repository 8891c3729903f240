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

use call_control::split::{HOLD_TIMEOUT, PROXY_ID_VARIABLE, QUIESCENCE_TIMEOUT};
use call_control::{
    Action, Activity, ActivityCallback, ActivityStatus, Call, SplitActivity, SplitError,
    SwitchError,
};
use futures::future::join;
use integration_test_utils::{sip_channel, two_party_call, HoldArrival, SwitchHarness};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn assert_owns_only(call: Option<Call>, channel: &call_control::Channel) {
    let call = call.expect("split call should exist");
    assert_eq!(call.channels().len(), 1);
    assert!(call.channels()[0].is_same(channel));
}

#[tokio::test(start_paused = true)]
async fn splits_two_party_call() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_ok");
    let (call, lhs, rhs) = two_party_call("100", "200");

    let split = SplitActivity::start(harness.context.clone(), call.clone()).await;

    assert!(split.success());
    assert!(split.error().is_none());
    assert_owns_only(split.lhs_call(), &lhs);
    assert_owns_only(split.rhs_call(), &rhs);
    assert_ne!(split.lhs_call().map(|call| call.id()), Some(call.id()));
    assert_ne!(split.rhs_call().map(|call| call.id()), Some(call.id()));
    assert_eq!(split.original_call().id(), call.id());
}

#[tokio::test(start_paused = true)]
async fn tags_channels_and_redirects_both_in_one_action() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_actions");
    let (call, lhs, rhs) = two_party_call("100", "200");

    SplitActivity::start(harness.context.clone(), call).await;

    let actions = harness.switch.recorded_actions();
    let tags: Vec<(u64, String, String)> = actions
        .iter()
        .filter_map(|action| match action {
            Action::SetVar {
                channel,
                variable,
                value,
            } => Some((channel.identity(), variable.clone(), value.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        tags,
        vec![
            (
                lhs.identity(),
                PROXY_ID_VARIABLE.to_string(),
                lhs.identity().to_string()
            ),
            (
                rhs.identity(),
                PROXY_ID_VARIABLE.to_string(),
                rhs.identity().to_string()
            ),
        ]
    );

    assert_eq!(harness.switch.count_actions("Redirect"), 1);
    let redirect = actions
        .iter()
        .find_map(|action| match action {
            Action::Redirect(redirect) => Some(redirect.clone()),
            _ => None,
        })
        .expect("redirect should be sent");
    assert!(redirect.channel.is_same(&lhs));
    assert!(redirect
        .extra_channel
        .as_ref()
        .is_some_and(|channel| channel.is_same(&rhs)));
    assert_eq!(redirect.context, "njr-management");
    assert_eq!(redirect.exten, "agi");
    assert_eq!(redirect.priority, 1);
    assert_eq!(redirect.extra_context.as_deref(), Some("njr-management"));
    assert_eq!(redirect.extra_exten.as_deref(), Some("agi"));
    assert_eq!(redirect.extra_priority, Some(1));
}

#[tokio::test(start_paused = true)]
async fn same_channel_is_refused_before_any_action() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_same");
    let channel = sip_channel("100");
    let call = Call::new(vec![channel.clone(), channel.clone()]);

    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert!(!split.success());
    assert_eq!(
        split.error(),
        Some(SplitError::SameChannel {
            channel: channel.name().to_string()
        })
    );
    assert!(split.lhs_call().is_none());
    assert!(split.rhs_call().is_none());
    assert!(harness.switch.recorded_actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn call_without_two_channels_is_refused() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_count");
    let call = Call::new(vec![sip_channel("100")]);

    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert_eq!(split.error(), Some(SplitError::NotTwoChannels { count: 1 }));
    assert!(harness.switch.recorded_actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn channels_stuck_in_transition_fail_the_split() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_transition");
    let (call, lhs, _rhs) = two_party_call("100", "200");
    lhs.set_in_transition(true);

    let started = Instant::now();
    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert_eq!(split.error(), Some(SplitError::ChannelsInTransition));
    assert_eq!(started.elapsed(), QUIESCENCE_TIMEOUT);
    assert!(split.lhs_call().is_none());
    assert!(harness.switch.recorded_actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn channels_settling_within_bound_are_split() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_settle");
    let (call, lhs, _rhs) = two_party_call("100", "200");
    lhs.set_in_transition(true);
    let settling = lhs.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        settling.set_in_transition(false);
    });

    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert!(split.success());
}

#[tokio::test(start_paused = true)]
async fn late_hold_arrival_within_bound_succeeds() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_late_hold");
    harness
        .switch
        .set_hold_arrival(HoldArrival::After(Duration::from_millis(600)));
    let (call, _lhs, _rhs) = two_party_call("100", "200");

    let started = Instant::now();
    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert!(split.success());
    assert!(started.elapsed() >= Duration::from_millis(600));
    assert!(started.elapsed() <= HOLD_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn one_channel_missing_hold_fails_without_split() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_one_hold");
    let (call, lhs, rhs) = two_party_call("100", "200");
    harness.switch.set_hold_arrival(HoldArrival::Only(lhs));

    let started = Instant::now();
    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert_eq!(
        split.error(),
        Some(SplitError::HoldNotReached {
            channels: vec![rhs.name().to_string()]
        })
    );
    assert_eq!(started.elapsed(), HOLD_TIMEOUT);
    assert!(split.lhs_call().is_none());
    assert!(split.rhs_call().is_none());
}

#[tokio::test(start_paused = true)]
async fn hold_arrival_after_bound_fails() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_slow_hold");
    harness
        .switch
        .set_hold_arrival(HoldArrival::After(Duration::from_millis(1500)));
    let (call, _lhs, _rhs) = two_party_call("100", "200");

    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert!(matches!(
        split.error(),
        Some(SplitError::HoldNotReached { channels }) if channels.len() == 2
    ));
}

#[tokio::test(start_paused = true)]
async fn rejected_redirect_still_waits_for_hold() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_rejected_redirect");
    harness.switch.reject_action("Redirect", "Channel not found");
    let (call, _lhs, _rhs) = two_party_call("100", "200");

    let started = Instant::now();
    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert!(matches!(
        split.error(),
        Some(SplitError::HoldNotReached { .. })
    ));
    assert_eq!(started.elapsed(), HOLD_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn unsent_redirect_fails_immediately() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_unsent_redirect");
    harness
        .switch
        .fail_action("Redirect", SwitchError::NotConnected);
    let (call, _lhs, _rhs) = two_party_call("100", "200");

    let started = Instant::now();
    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert_eq!(
        split.error(),
        Some(SplitError::RedirectFailed(SwitchError::NotConnected))
    );
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn failed_tag_stops_before_redirect() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_tag");
    harness.switch.reject_action("Setvar", "No such channel");
    let (call, _lhs, _rhs) = two_party_call("100", "200");

    let split = SplitActivity::start(harness.context.clone(), call).await;

    assert!(matches!(split.error(), Some(SplitError::TagFailed(_))));
    assert_eq!(harness.switch.count_actions("Setvar"), 1);
    assert_eq!(harness.switch.count_actions("Redirect"), 0);
}

#[tokio::test(start_paused = true)]
async fn spawned_split_reports_progress() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_spawned");
    let callback = integration_test_utils::RecordingActivityCallback::new();
    let (call, lhs, _rhs) = two_party_call("100", "200");

    let (split, handle) = SplitActivity::spawn(
        harness.context.clone(),
        call,
        Some(Arc::new(callback.clone()) as Arc<dyn ActivityCallback>),
    );

    assert!(handle.await.expect("split task should not panic"));
    assert_owns_only(split.lhs_call(), &lhs);
    assert_eq!(
        callback.reports().await,
        vec![
            ("split".to_string(), ActivityStatus::Starting),
            ("split".to_string(), ActivityStatus::Success),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn split_runs_once() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_once");
    let (call, _lhs, _rhs) = two_party_call("100", "200");

    let split = SplitActivity::start(harness.context.clone(), call).await;
    let sent = harness.switch.recorded_actions().len();

    assert!(split.run().await);
    assert_eq!(harness.switch.recorded_actions().len(), sent);
    assert!(split.required_events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn independent_splits_run_concurrently() {
    integration_test_utils::init_logging();

    let harness = SwitchHarness::new("split_concurrent");
    harness
        .switch
        .set_hold_arrival(HoldArrival::After(Duration::from_millis(400)));
    let (first_call, first_lhs, _) = two_party_call("100", "200");
    let (second_call, second_lhs, _) = two_party_call("300", "400");

    let started = Instant::now();
    let (first, second) = join(
        SplitActivity::start(harness.context.clone(), first_call),
        SplitActivity::start(harness.context.clone(), second_call),
    )
    .await;

    assert!(first.success());
    assert!(second.success());
    assert_owns_only(first.lhs_call(), &first_lhs);
    assert_owns_only(second.lhs_call(), &second_lhs);
    assert!(started.elapsed() < Duration::from_millis(800));
    assert_eq!(harness.switch.count_actions("Redirect"), 2);
}
