//! Retry policy for analysis calls

use std::time::Duration;

/// Bounded retry with a constant delay between attempts.
///
/// Attempt numbers are 0-indexed: attempt 0 is the first call, so a policy
/// with `max_retries = 3` makes at most four calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Wait between a failed attempt and the next one
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Create a fixed-delay policy
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total number of calls this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether a failure on `attempt` should be followed by another attempt
    pub fn should_retry(&self, attempt: u32, error: &vintent_client::Error) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }

    /// Delay to wait after a failure on `attempt`. Constant, not exponential.
    pub fn delay_for(&self, _attempt: u32) -> Duration {
        self.delay
    }
}
