//! Retry and backoff policy.
//!
//! Pure functions of the attempt index and the last error, shared by every
//! query and mutation. Attempt indices are 0-based: attempt 0 is the first
//! failure.

use std::time::Duration;

use super::QueryError;

/// Additional attempts made after the first failure.
pub const MAX_RETRIES: u32 = 2;

/// Delay before the first retry.
pub const BASE_DELAY: Duration = Duration::from_millis(1_000);

/// Upper bound for any single retry delay.
pub const MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Returns true if a request that failed on `attempt` with `error` should be
/// tried again. Authorization failures are never retried, regardless of
/// attempt.
pub fn should_retry(attempt: u32, error: &QueryError) -> bool {
    RetryPolicy::default().should_retry(attempt, error)
}

/// Returns the delay before retry `attempt`: `min(1000 * 2^attempt, 30000)` ms.
///
/// # Examples
///
/// ```
/// use campusync_core::query::retry_delay;
/// use std::time::Duration;
///
/// assert_eq!(retry_delay(0), Duration::from_millis(1_000));
/// assert_eq!(retry_delay(2), Duration::from_millis(4_000));
/// assert_eq!(retry_delay(10), Duration::from_millis(30_000));
/// ```
pub fn retry_delay(attempt: u32) -> Duration {
    RetryPolicy::default().delay(attempt)
}

/// Retry configuration: how many retries, and the exponential delay curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn should_retry(&self, attempt: u32, error: &QueryError) -> bool {
        if error.is_unauthorized() {
            return false;
        }
        error.is_retryable() && attempt < self.max_retries
    }

    /// Exponential delay for `attempt`, capped at `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let cap = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(base.saturating_mul(factor).min(cap))
    }
}
