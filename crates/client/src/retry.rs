//! Async retry loop shared by reads and writes.

use std::future::Future;

use campusync_core::query::{QueryError, RetryPolicy};

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// exhausts `policy`. Sleeps `policy.delay(attempt)` between attempts.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    operation: F,
) -> Result<T, QueryError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, QueryError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if policy.should_retry(attempt, &error) => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    label,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                tracing::debug!(label, attempts = attempt + 1, error = %error, "Request failed");
                return Err(error);
            }
        }
    }
}
