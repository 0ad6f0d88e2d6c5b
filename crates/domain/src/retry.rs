//! Exponential-backoff retry for fallible async operations

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Lowercase substrings that mark a failure as transient
pub const RETRYABLE_SIGNATURES: &[&str] = &[
    "xhr error",
    "rpc failed",
    "network error",
    "timed out",
    "500",
    "429",
    "rate-limited",
    "at capacity",
    "overloaded",
    "503",
    "unavailable",
];

/// Retry policy: delay after attempt `n` is `initial_delay_ms * backoff_multiplier^(n-1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Build a policy; `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, initial_delay_ms: u64, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay_ms,
            backoff_multiplier,
        }
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self::new(1, 0, 1.0)
    }

    /// Delay slept after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis(millis.max(0.0).round() as u64)
    }
}

/// Whether an error message matches one of the retryable signatures
pub fn is_retryable(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_SIGNATURES
        .iter()
        .any(|signature| lower.contains(signature))
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are exhausted. The last error is returned unchanged.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let message = error.to_string();
                if attempt >= max_attempts || !is_retryable(&message) {
                    return Err(error);
                }

                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "Provider call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn test_delay_schedule_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, 10, 2.0).max_attempts, 1);
    }

    #[test]
    fn test_retryable_signatures_are_case_insensitive() {
        assert!(is_retryable("HTTP 500: Internal error"));
        assert!(is_retryable("Model is AT CAPACITY"));
        assert!(is_retryable("You have been Rate-Limited"));
        assert!(is_retryable("The model is OVERLOADED"));
        assert!(!is_retryable("invalid api key"));
        assert!(!is_retryable("permission denied"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result: Result<&str, String> = with_retry(&RetryPolicy::default(), || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err("HTTP 500: internal".to_string())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        let elapsed = start.elapsed();
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(3100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_attempted_once() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), String> = with_retry(&RetryPolicy::default(), || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("invalid api key".to_string())
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "invalid api key");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), String> = with_retry(&RetryPolicy::default(), || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("HTTP 429: attempt {}", n))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap_err(), "HTTP 429: attempt 3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overloaded_model_is_retried_until_exhausted() {
        use crate::error::{CallContext, ErrorKind, RawError, classify};
        use crate::ports::ProviderError;

        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), ProviderError> = with_retry(&RetryPolicy::default(), || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Status {
                    status: 503,
                    message: "UNAVAILABLE: The model is overloaded. Please try again later."
                        .to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let raw = RawError::from(result.unwrap_err());
        assert_eq!(classify(&raw, CallContext::Tweet).kind, ErrorKind::Capacity);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_do_not_share_attempts() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::default();

        let run = |counter: Arc<AtomicU32>| {
            let policy = policy;
            async move {
                with_retry(&policy, || {
                    let counter = Arc::clone(&counter);
                    async move {
                        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        if n < 2 {
                            Err("rpc failed".to_string())
                        } else {
                            Ok(n)
                        }
                    }
                })
                .await
            }
        };

        let (a, b) = futures::join!(run(Arc::clone(&first)), run(Arc::clone(&second)));
        assert_eq!(a.unwrap(), 2);
        assert_eq!(b.unwrap(), 2);
    }
}
