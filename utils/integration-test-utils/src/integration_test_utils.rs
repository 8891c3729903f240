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

use call_control::{Call, Channel, EventHub, SwitchContext, SwitchSettings};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::ScriptedSwitch;

static NEXT_CHANNEL_SUFFIX: AtomicU64 = AtomicU64::new(1);

/// Installs a test-writer `fmt` subscriber honouring `RUST_LOG`. Safe to call
/// from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn next_suffix() -> u64 {
    NEXT_CHANNEL_SUFFIX.fetch_add(1, Ordering::Relaxed)
}

/// A real party channel such as `SIP/200-00000007`.
pub fn sip_channel(extension: &str) -> Channel {
    let suffix = next_suffix();
    Channel::new(
        &format!("SIP/{extension}-{suffix:08x}"),
        &format!("1700000000.{suffix}"),
    )
}

/// A switch-internal linking channel such as `Local/200@default-00000008;1`.
pub fn local_channel(extension: &str) -> Channel {
    let suffix = next_suffix();
    Channel::new(
        &format!("Local/{extension}@default-{suffix:08x};1"),
        &format!("1700000000.{suffix}"),
    )
}

/// A two-party call between fresh `SIP` channels for `lhs` and `rhs`.
pub fn two_party_call(lhs: &str, rhs: &str) -> (Call, Channel, Channel) {
    let lhs = sip_channel(lhs);
    let rhs = sip_channel(rhs);
    (Call::new(vec![lhs.clone(), rhs.clone()]), lhs, rhs)
}

/// Scripted switch, in-process hub and the context wiring them together.
pub struct SwitchHarness {
    pub switch: Arc<ScriptedSwitch>,
    pub hub: Arc<EventHub>,
    pub context: SwitchContext,
}

impl SwitchHarness {
    pub fn new(name: &str) -> Self {
        Self::with_settings(name, SwitchSettings::default())
    }

    pub fn with_settings(name: &str, settings: SwitchSettings) -> Self {
        let switch = Arc::new(ScriptedSwitch::new(name));
        let hub = Arc::new(EventHub::new());
        let context = SwitchContext::new(switch.clone(), hub.clone(), settings);

        Self {
            switch,
            hub,
            context,
        }
    }
}

/// Polls `condition` every millisecond until it holds or `bound` passes.
pub async fn wait_until<F>(bound: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + bound;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
