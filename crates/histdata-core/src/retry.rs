//! Retry policy with bounded exponential backoff.
//!
//! [`RetryPolicy`] wraps a single remote-fetch operation. Failures classified
//! as transient ([`DataError::is_transient`]) are retried after a doubling
//! delay, bounded by a maximum delay and a maximum attempt count; permanent
//! failures surface immediately. A rate-limit `retry_after` hint from the
//! provider is honored when it exceeds the computed backoff, still capped by
//! the maximum delay.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{DataError, Result};

/// Floor applied to a configured base delay of zero.
const MIN_BASE_DELAY: Duration = Duration::from_millis(50);

/// Default number of attempts.
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default base delay between attempts.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(3);

/// Default upper bound on a single backoff delay.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Largest doubling exponent; keeps the shift well away from overflow.
const MAX_EXPONENT: u32 = 16;

/// Bounded exponential-backoff retry policy.
///
/// The delay before attempt `n` (for `n >= 2`) is `base_delay * 2^(n-2)`,
/// capped at `max_delay`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy with the given total attempt bound and base delay.
    ///
    /// An attempt count of zero is clamped to one (single attempt, no
    /// retries); a zero base delay is clamped to a safe minimum.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: base_delay.max(MIN_BASE_DELAY),
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Sets the upper bound on a single backoff delay.
    ///
    /// Clamped to at least the base delay.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay.max(self.base_delay);
        self
    }

    /// Returns the total attempt bound.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the base delay.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the upper bound on a single backoff delay.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait before the given attempt (2-based), honoring a provider
    /// `retry_after` hint when it exceeds the computed backoff.
    fn delay_before(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let exponent = attempt.saturating_sub(2).min(MAX_EXPONENT);
        let backoff = self.base_delay.saturating_mul(1u32 << exponent);
        let delay = hint.map_or(backoff, |hint| hint.max(backoff));
        delay.min(self.max_delay)
    }

    /// Runs `operation` under this policy.
    ///
    /// Transient errors are retried up to the attempt bound; a permanent
    /// error fails immediately without retry. When all attempts are
    /// exhausted the last transient error is surfaced wrapped in
    /// [`DataError::FetchFailed`].
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error: Option<DataError> = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let hint = match last_error.as_ref() {
                    Some(DataError::RateLimited { retry_after, .. }) => *retry_after,
                    _ => None,
                };
                let delay = self.delay_before(attempt, hint);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "backing off before retry"
                );
                sleep(delay).await;
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "transient fetch error"
                    );
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(DataError::FetchFailed {
            attempts: self.max_attempts,
            source: Box::new(last_error.unwrap_or_else(|| {
                DataError::Network("fetch operation never ran".to_string())
            })),
        })
    }
}
