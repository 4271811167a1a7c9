// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry with randomized backoff for calls to external collaborators
//!
//! Individual RPC calls never retry. A stage may use this policy while the
//! daemon is still coming up, and for the GitHub and OAuth wrappers it calls.
//! Attempts are fixed, the pause between them is random in
//! `[min_backoff, max_backoff)`, and the last error is surfaced at the end.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Attempt count and backoff window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            min_backoff,
            max_backoff,
        }
    }

    /// Random pause in `[min_backoff, max_backoff)`
    pub fn backoff(&self) -> Duration {
        let min = self.min_backoff.as_millis() as u64;
        let max = self.max_backoff.as_millis() as u64;
        if max <= min {
            return self.min_backoff;
        }
        Duration::from_millis(rand::rng().random_range(min..max))
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    /// The error from the final attempt
    pub fn into_last(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

/// Run `operation` until it succeeds or the policy's attempts are spent.
///
/// `on_error` sees each failure with its 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
    mut on_error: impl FnMut(u32, &E),
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                on_error(attempt, &e);
                if attempt >= max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
            }
        }

        let pause = policy.backoff();
        tracing::debug!(attempt, pause_ms = pause.as_millis() as u64, "retrying after backoff");
        tokio::time::sleep(pause).await;
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
