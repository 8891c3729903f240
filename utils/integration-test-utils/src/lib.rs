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

mod scripted_switch;
pub use scripted_switch::{HoldArrival, ScriptedSwitch};
mod integration_test_utils;

pub use integration_test_utils::{
    init_logging, local_channel, sip_channel, two_party_call, wait_until, SwitchHarness,
};
mod integration_test_listeners;
pub use integration_test_listeners::{
    RecordingActivityCallback, RecordingChannelListener, RecordingEventListener,
};
mod failing_register_feed;
pub use failing_register_feed::FailingRegisterFeed;
mod log_capture;
pub use log_capture::LoggedEvents;
