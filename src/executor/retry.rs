//! Bounded retry with jittered exponential backoff.
//!
//! Only venue errors classified retryable (timeouts, rate limits,
//! transient transport) are retried; fatal order errors abort on the
//! first attempt. Full jitter spreads retries so both legs of an
//! execution don't hammer a struggling venue in lockstep.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::ExecutionConfig;
use crate::error::VenueError;

/// Retry policy for venue calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts including the first (minimum 1).
    pub max_attempts: u32,
    /// Base delay before the second attempt.
    pub base_delay: Duration,
    /// Cap on the backoff delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Build from the execution configuration.
    #[must_use]
    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Jittered delay before the given retry (1-based attempt count of
    /// the attempt that just failed): random in `[0, min(cap, base * 2^(n-1))]`.
    #[must_use]
    pub fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(31);
        let exponential = self
            .base_delay
            .as_millis()
            .saturating_mul(1u128 << exponent);
        let capped = exponential.min(self.max_delay.as_millis()) as u64;
        if capped == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=capped))
    }
}

/// Run `operation` under the policy, retrying only retryable errors.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// fatal error immediately.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, VenueError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, VenueError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.backoff_delay(attempt);
                debug!(
                    label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying venue call"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(label, attempt, error = %e, "retry attempts exhausted");
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn backoff_is_bounded_by_cap() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        for attempt in 1..=10 {
            assert!(policy.backoff_delay(attempt) <= Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn retryable_errors_are_retried_to_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_policy(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(VenueError::Unavailable("transient".into()))
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(3), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(VenueError::RateLimited { retry_after_secs: None }) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_abort_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(VenueError::InsufficientFunds("need 10".into())) }
        })
        .await;
        assert!(matches!(result, Err(VenueError::InsufficientFunds(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
