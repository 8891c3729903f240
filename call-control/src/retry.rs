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

//! Cancellable timed-retry primitive shared by both engines.
//!
//! Every bounded wait in the crate (channel-variable propagation, channel
//! quiescence, holding-point arrival) is expressed as a [`RetryPolicy`] plus an
//! attempt closure. An attempt returns `Ok(Some(value))` to finish,
//! `Ok(None)` to keep polling, or `Err(_)` to record a failure and keep polling.
//!
//! ```
//! use std::time::Duration;
//! use call_control::retry::{poll_until, RetryPolicy};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let cancel = CancellationToken::new();
//! let policy = RetryPolicy::within(Duration::from_millis(10), Duration::from_millis(50));
//!
//! let ready = poll_until(policy, &cancel, |attempt| async move { attempt == 3 }).await;
//! assert!(ready);
//! # });
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Sleep one interval before the first attempt as well as between attempts.
    pub delay_first: bool,
}

impl RetryPolicy {
    /// Exactly `max_attempts` attempts, each preceded by one `interval` sleep.
    pub const fn attempts(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            delay_first: true,
        }
    }

    /// Probes immediately, then once per `interval` until `bound` has elapsed.
    pub fn within(interval: Duration, bound: Duration) -> Self {
        let interval_millis = interval.as_millis().max(1);
        let polls = u32::try_from(bound.as_millis() / interval_millis).unwrap_or(u32::MAX);

        Self {
            interval,
            max_attempts: polls.saturating_add(1),
            delay_first: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    Ready { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: Option<E> },
    Cancelled { attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_ready(&self) -> bool {
        matches!(self, RetryOutcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Ready { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Cancelled { attempts } => *attempts,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            RetryOutcome::Ready { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Runs `attempt` under `policy` until it yields a value, the attempts run out
/// or `cancel` fires. The closure receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut attempt: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let mut last_error = None;

    for attempt_number in 1..=policy.max_attempts {
        if policy.delay_first || attempt_number > 1 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return RetryOutcome::Cancelled { attempts: attempt_number - 1 };
                }
                _ = tokio::time::sleep(policy.interval) => {}
            }
        } else if cancel.is_cancelled() {
            return RetryOutcome::Cancelled { attempts: 0 };
        }

        match attempt(attempt_number).await {
            Ok(Some(value)) => {
                return RetryOutcome::Ready {
                    value,
                    attempts: attempt_number,
                }
            }
            Ok(None) => {}
            Err(err) => last_error = Some(err),
        }
    }

    RetryOutcome::Exhausted {
        attempts: policy.max_attempts,
        last_error,
    }
}

/// Predicate form of [`retry`]: `true` once `predicate` held within the policy.
pub async fn poll_until<F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut predicate: F,
) -> bool
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = bool>,
{
    retry::<(), Infallible, _, _>(policy, cancel, |attempt_number| {
        let check = predicate(attempt_number);
        async move { Ok(check.await.then_some(())) }
    })
    .await
    .is_ready()
}

#[cfg(test)]
mod tests {
    use super::{poll_until, retry, RetryOutcome, RetryPolicy};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn within_counts_the_immediate_probe() {
        let policy = RetryPolicy::within(Duration::from_millis(100), Duration::from_millis(3000));

        assert_eq!(policy.max_attempts, 31);
        assert!(!policy.delay_first);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_at_max_attempts_and_keeps_last_error() {
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let outcome: RetryOutcome<(), String> = retry(
            RetryPolicy::attempts(Duration::from_millis(100), 5),
            &cancel,
            |attempt_number| {
                calls.fetch_add(1, Ordering::Relaxed);
                async move { Err(format!("attempt {attempt_number}")) }
            },
        )
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 5);
        assert_eq!(
            outcome,
            RetryOutcome::Exhausted {
                attempts: 5,
                last_error: Some("attempt 5".to_string())
            }
        );
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_returns_first_value() {
        let cancel = CancellationToken::new();

        let outcome: RetryOutcome<&str, ()> = retry(
            RetryPolicy::attempts(Duration::from_millis(100), 5),
            &cancel,
            |attempt_number| async move { Ok((attempt_number == 2).then_some("found")) },
        )
        .await;

        assert_eq!(
            outcome,
            RetryOutcome::Ready {
                value: "found",
                attempts: 2
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_retry_stops_sleeping() {
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            canceller.cancel();
        });

        let outcome: RetryOutcome<(), ()> = retry(
            RetryPolicy::attempts(Duration::from_millis(100), 10),
            &cancel,
            |_| {
                calls.fetch_add(1, Ordering::Relaxed);
                async { Ok(None) }
            },
        )
        .await;

        assert_eq!(outcome, RetryOutcome::Cancelled { attempts: 2 });
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_until_probes_immediately() {
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let ready = poll_until(
            RetryPolicy::within(Duration::from_millis(100), Duration::from_millis(1000)),
            &cancel,
            |_| async { true },
        )
        .await;

        assert!(ready);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_until_gives_up_after_bound() {
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let ready = poll_until(
            RetryPolicy::within(Duration::from_millis(100), Duration::from_millis(1000)),
            &cancel,
            |_| async { false },
        )
        .await;

        assert!(!ready);
        assert_eq!(started.elapsed(), Duration::from_millis(1000));
    }
}
