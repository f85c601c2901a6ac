//! Fetch retry with exponential backoff
//!
//! Transient failures (see [`FetchError::is_transient`]) are retried until a
//! maximum total wait elapses; anything else fails on the first attempt.
//!
//! **Backoff Strategy:**
//! - Initial delay: 10ms
//! - Max delay: 1000ms
//! - Multiplier: 2.0 (exponential)

use crate::FetchError;
use std::future::Future;
use std::time::{Duration, Instant};

const INITIAL_BACKOFF_MS: u64 = 10;
const MAX_BACKOFF_MS: u64 = 1000;

/// Run `operation` until it succeeds, fails permanently, or `max_wait` elapses
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "prefecture table")
/// * `max_wait` - Maximum total time spent retrying
/// * `operation` - Async closure performing one fetch attempt
pub async fn retry_transient<F, Fut, T>(
    operation_name: &str,
    max_wait: Duration,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let start_time = Instant::now();
    let mut attempt = 0u32;
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        attempt += 1;

        if attempt > 1 {
            tracing::debug!(operation = operation_name, attempt, "Retrying catalog fetch");
        }

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis(),
                        "Catalog fetch succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_transient() {
                    return Err(err);
                }

                let elapsed = start_time.elapsed();
                if elapsed >= max_wait {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = elapsed.as_millis(),
                        max_wait_ms = max_wait.as_millis(),
                        error = %err,
                        "Catalog fetch failed: max retry time exceeded"
                    );
                    return Err(err);
                }

                // Never sleep past the deadline
                let next_backoff = Duration::from_millis(backoff_ms.min(MAX_BACKOFF_MS))
                    .min(max_wait.saturating_sub(elapsed));

                tracing::debug!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = next_backoff.as_millis(),
                    error = %err,
                    "Transient catalog fetch error, will retry after backoff"
                );

                tokio::time::sleep(next_backoff).await;
                backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_succeeds_first_attempt() {
        let result = retry_transient("test_op", Duration::from_secs(1), || async {
            Ok::<i32, FetchError>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_errors() {
        let attempts = AtomicU32::new(0);

        let result = retry_transient("test_op", Duration::from_secs(5), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(FetchError::Http(503, "busy".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_wait() {
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result = retry_transient("test_op", Duration::from_millis(50), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, FetchError>(FetchError::Network("unreachable".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Network(_))));
        assert!(attempts.load(Ordering::SeqCst) > 1);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_permanent_error_fails_immediately() {
        let attempts = AtomicU32::new(0);

        let result = retry_transient("test_op", Duration::from_secs(5), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, FetchError>(FetchError::NotFound("/ja.json".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(FetchError::NotFound(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1); // Should not retry
    }
}
