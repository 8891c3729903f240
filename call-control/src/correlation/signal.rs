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

//! One-shot completion signal for a single origination attempt.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

/// Lives outside the operation's state lock so an abort can wake the waiting
/// caller while an event handler still holds that lock.
pub(crate) struct CompletionSignal {
    sender: Mutex<Option<oneshot::Sender<()>>>,
    receiver: Mutex<Option<oneshot::Receiver<()>>>,
    fire_count: AtomicU32,
    aborted: AtomicBool,
    abort_reason: Mutex<Option<String>>,
}

impl CompletionSignal {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            fire_count: AtomicU32::new(0),
            aborted: AtomicBool::new(false),
            abort_reason: Mutex::new(None),
        }
    }

    /// Releases the waiter. Only the first call has any effect; returns
    /// whether this call was it.
    pub(crate) fn fire(&self) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                self.fire_count.fetch_add(1, Ordering::AcqRel);
                // The receiver may already be gone when the waiter timed out.
                let _ = sender.send(());
                true
            }
            None => false,
        }
    }

    pub(crate) fn abort(&self, reason: &str) -> bool {
        {
            let mut abort_reason = self
                .abort_reason
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if abort_reason.is_none() {
                *abort_reason = Some(reason.to_string());
            }
        }
        self.aborted.store(true, Ordering::Release);
        self.fire()
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    pub(crate) fn abort_reason(&self) -> Option<String> {
        self.abort_reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn fire_count(&self) -> u32 {
        self.fire_count.load(Ordering::Acquire)
    }

    /// Waits up to `bound` for the signal. Returns `false` on expiry. A second
    /// wait returns immediately with whether the signal has fired.
    pub(crate) async fn wait(&self, bound: Duration) -> bool {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match receiver {
            Some(receiver) => tokio::time::timeout(bound, receiver).await.is_ok(),
            None => self.fire_count() > 0,
        }
    }
}
