//! Property-based tests for failure classification and the retry executor
//!
//! These tests use proptest to verify invariants across many random inputs.

use std::{fmt, time::Duration};

use ai_core::{Classify, ErrorKind, RetryPolicy, execute};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
struct Failure(ErrorKind);

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failure {}", self.0)
    }
}

impl Classify for Failure {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

fn kind_strategy() -> impl Strategy<Value = ErrorKind> {
    prop_oneof![
        Just(ErrorKind::RateLimited),
        Just(ErrorKind::ServerOverload),
        Just(ErrorKind::Other),
    ]
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

// ============================================================================
// Classification Property Tests
// ============================================================================

mod classification_tests {
    use super::*;

    proptest! {
        #[test]
        fn status_is_retryable_iff_429_or_5xx(status in 100u16..1000) {
            let retryable = status == 429 || (500..=599).contains(&status);
            prop_assert_eq!(ErrorKind::from_status(status).is_retryable(), retryable);
        }

        #[test]
        fn any_message_containing_429_is_rate_limited(
            pre in "[a-z ]{0,16}",
            post in "[a-z0-9 ]{0,16}"
        ) {
            let message = format!("{pre}429{post}");
            prop_assert_eq!(ErrorKind::from_message(&message), ErrorKind::RateLimited);
        }

        #[test]
        fn message_without_digits_is_other(message in "[a-zA-Z .:]{0,64}") {
            prop_assert_eq!(ErrorKind::from_message(&message), ErrorKind::Other);
        }
    }
}

// ============================================================================
// Backoff Property Tests
// ============================================================================

mod backoff_tests {
    use super::*;

    proptest! {
        #[test]
        fn delay_multiplies_each_retry(
            initial in 1u64..5_000,
            multiplier in 1u32..5,
            retry in 0u32..6
        ) {
            let policy = RetryPolicy::new(10, initial, multiplier);
            prop_assert_eq!(
                policy.delay_for_retry(retry + 1),
                policy.delay_for_retry(retry) * multiplier
            );
        }

        #[test]
        fn delays_never_shrink(
            initial in 0u64..5_000,
            multiplier in 1u32..5,
            retry in 0u32..6
        ) {
            let policy = RetryPolicy::new(10, initial, multiplier);
            prop_assert!(policy.delay_for_retry(retry + 1) >= policy.delay_for_retry(retry));
        }

        #[test]
        fn attempts_never_exceed_ceiling(
            max_attempts in 1u32..6,
            kinds in proptest::collection::vec(kind_strategy(), 1..10)
        ) {
            let policy = RetryPolicy::new(max_attempts, 100, 2);
            let mut calls = 0usize;

            let result = paused_runtime().block_on(execute(&policy, || {
                let kind = kinds[calls.min(kinds.len() - 1)];
                calls += 1;
                async move { Err::<(), _>(Failure(kind)) }
            }));

            let err = result.unwrap_err();
            prop_assert!(calls <= max_attempts as usize);
            prop_assert_eq!(err.attempts as usize, calls);

            // Stops at the first terminal failure, else runs to the ceiling
            let first_terminal = kinds
                .iter()
                .position(|k| !k.is_retryable())
                .map(|i| i + 1);
            let expected = match first_terminal {
                Some(n) if n <= max_attempts as usize => n,
                _ => max_attempts as usize,
            };
            prop_assert_eq!(calls, expected);
        }

        #[test]
        fn total_sleep_matches_worst_case(max_attempts in 1u32..6) {
            let policy = RetryPolicy::new(max_attempts, 1000, 2);

            let elapsed = paused_runtime().block_on(async {
                let start = tokio::time::Instant::now();
                let _ = execute(&policy, || async {
                    Err::<(), _>(Failure(ErrorKind::ServerOverload))
                })
                .await;
                start.elapsed()
            });

            prop_assert_eq!(elapsed, policy.worst_case_sleep());
            prop_assert!(elapsed < Duration::from_secs(1 << max_attempts));
        }
    }
}
