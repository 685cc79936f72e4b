//! Caller-side retry policy.
//!
//! Gateways never retry on their own. Callers that want to repeat an
//! idempotent read wrap it in [`RetryPolicy::run`].

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::GatewayError;

/// Errors that may carry a gateway failure worth retrying.
pub trait Retryable: Display {
    /// The underlying gateway error, if any.
    fn gateway_error(&self) -> Option<&GatewayError>;
}

impl Retryable for GatewayError {
    fn gateway_error(&self) -> Option<&GatewayError> {
        Some(self)
    }
}

/// Policy for retrying failed gateway calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Whether to double the delay after each attempt.
    pub exponential_backoff: bool,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryPolicy {
    /// Creates a policy with the given number of attempts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(500),
            exponential_backoff: true,
            max_delay: Duration::from_secs(10),
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            exponential_backoff: false,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Enables or disables exponential backoff.
    #[must_use]
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Calculates the delay after a given (1-based) failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            self.base_delay
                .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        } else {
            self.base_delay
        };
        delay.min(self.max_delay)
    }

    /// Returns true if an error should be retried.
    pub fn should_retry(&self, error: &GatewayError) -> bool {
        error.is_retryable()
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the last error.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: Retryable,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e)
                    if attempt < self.max_attempts
                        && e.gateway_error().is_some_and(|g| self.should_retry(g)) =>
                {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
