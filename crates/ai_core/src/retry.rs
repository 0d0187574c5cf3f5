//! Retry policy executor with exponential backoff
//!
//! Wraps a single outbound call. Failures are classified through
//! [`Classify`]; retryable kinds are retried after a doubling delay until
//! the attempt ceiling is reached, everything else surfaces immediately.
//!
//! ```text
//! Idle → Attempting → Succeeded
//!                   → Sleeping → Attempting
//!                   → Failed
//! ```
//!
//! The state (attempt index, current delay) lives on the stack of one
//! [`execute`] call and is never shared between calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use ai_core::retry::{RetryPolicy, execute};
//!
//! let reply = execute(&RetryPolicy::default(), || engine.generate(&request)).await?;
//! ```

use std::{error::Error, fmt, future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Classify, ErrorKind};

/// Backoff parameters for one logical outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds (default: 1000ms)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Factor applied to the delay after every retry (default: 2)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_delay_ms() -> u64 {
    1000
}

const fn default_backoff_multiplier() -> u32 {
    2
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with custom parameters
    pub const fn new(max_attempts: u32, initial_delay_ms: u64, backoff_multiplier: u32) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            backoff_multiplier,
        }
    }

    /// A policy that makes exactly one attempt
    pub const fn no_retry() -> Self {
        Self::new(1, 0, 1)
    }

    /// Delay before the first retry
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Delay before retry number `retry` (0-based), ignoring the ceiling
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.saturating_pow(retry);
        self.initial_delay().saturating_mul(factor)
    }

    /// Cumulative sleep when every attempt fails with a retryable kind
    pub fn worst_case_sleep(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|retry| self.delay_for_retry(retry))
            .sum()
    }
}

/// A failure surfaced by [`execute`], tagged with its classification
#[derive(Debug)]
pub struct RetryError<E> {
    /// Kind of the last failure
    pub kind: ErrorKind,
    /// Attempts made, including the failing one
    pub attempts: u32,
    /// The last failure, unchanged
    pub source: E,
}

impl<E> RetryError<E> {
    /// Whether retries were exhausted on a retryable kind
    pub const fn exhausted(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}, after {} attempt(s)]",
            self.source, self.kind, self.attempts
        )
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Run `operation` under `policy`.
///
/// Success returns immediately. A retryable failure sleeps for the current
/// delay, multiplies it, and tries again while attempts remain. A terminal
/// failure, or the last allowed attempt failing, returns a [`RetryError`].
/// Attempt `k + 1` never starts before attempt `k` has resolved.
pub async fn execute<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    let mut delay = policy.initial_delay();

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "Call succeeded after retries");
                }
                return Ok(value);
            },
            Err(err) => {
                let kind = err.kind();

                if kind.is_retryable() && attempt + 1 < max_attempts {
                    #[allow(clippy::cast_possible_truncation)]
                    let delay_ms = delay.as_millis() as u64;
                    warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms,
                        kind = %kind,
                        error = %err,
                        "Upstream call failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(policy.backoff_multiplier);
                    attempt += 1;
                    continue;
                }

                debug!(
                    attempts = attempt + 1,
                    kind = %kind,
                    error = %err,
                    "Upstream call failed, giving up"
                );
                return Err(RetryError {
                    kind,
                    attempts: attempt + 1,
                    source: err,
                });
            },
        }
    }
}
