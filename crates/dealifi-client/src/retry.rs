//! Fixed-delay retry for RPC propagation lag.
//!
//! Freshly created accounts take a few seconds to become visible on the RPC
//! node the client reads from. Reads right after a write are retried on a
//! linear schedule.

use std::future::Future;
use std::time::Duration;

/// How often and how long to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Confirming collection metadata after creating the collection NFT.
    pub const COLLECTION_METADATA: Self = Self::new(5, Duration::from_secs(3));

    /// Fetching a candy machine account.
    pub const CANDY_MACHINE_FETCH: Self = Self::new(10, Duration::from_secs(3));

    /// Create a policy.
    #[must_use]
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Single attempt, no waiting.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::CANDY_MACHINE_FETCH
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts.
///
/// The error of the last attempt is returned as-is.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last retryable one.
pub async fn retry_if<T, E, F, Fut, P>(
    policy: RetryPolicy,
    mut op: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && is_retryable(&err) => {
                tracing::debug!(
                    attempt,
                    attempts,
                    delay_ms = u64::try_from(policy.delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Retrying after transient error"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Missing,
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn retryable(err: &TestError) -> bool {
        *err == TestError::Missing
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);

        let result = retry_if(
            RetryPolicy::new(5, Duration::from_secs(3)),
            move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError::Missing)
                } else {
                    Ok(42)
                }
            },
            retryable,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_policy_attempts() {
        let calls = &AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = retry_if(
            RetryPolicy::COLLECTION_METADATA,
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Missing)
            },
            retryable,
        )
        .await;

        assert_eq!(result, Err(TestError::Missing));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // Four pauses between five attempts
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(12) && elapsed < Duration::from_secs(13));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_propagates_immediately() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = retry_if(
            RetryPolicy::CANDY_MACHINE_FETCH,
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            },
            retryable,
        )
        .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = retry_if(
            RetryPolicy::new(0, Duration::ZERO),
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Missing)
            },
            retryable,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
