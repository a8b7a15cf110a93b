//! Retry policy for external agent calls
//!
//! Backoff is a pure function of the 0-indexed attempt number so callers can
//! drive it with any sleeper.

use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry, backoff and timeout parameters for one agent call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts (not retries)
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles each attempt
    pub base_delay: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Minimum trimmed length of an acceptable response
    pub min_response_chars: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            timeout: DEFAULT_TIMEOUT,
            min_response_chars: 1,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            timeout,
            ..Default::default()
        }
    }

    pub fn with_min_response_chars(mut self, chars: usize) -> Self {
        self.min_response_chars = chars;
        self
    }

    /// `base_delay * 2^attempt`, saturating
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether a response payload is long enough to accept
    pub fn is_acceptable(&self, text: &str) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty() && trimmed.chars().count() >= self.min_response_chars
    }
}
