//! Retry policy: which failures are retried and how long to wait.

use std::time::Duration;

use crate::config::{HTTP_STATUS_TOO_MANY_REQUESTS, RETRY_FACTOR};

/// Returns whether a failed attempt with this status may be retried.
///
/// Only 429 (Too Many Requests) and 5xx are transient. Every other status is
/// permanent for this endpoint.
pub fn is_retriable_status(status: u16) -> bool {
    status == HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(&status)
}

/// Bounded exponential backoff.
///
/// Attempts are numbered from 1. After a retriable failure of attempt `n`, the
/// requester waits `base_delay * 2^(n-1)` and tries again, until `max_attempts`
/// attempts have been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Whether another attempt may follow attempt number `attempt`.
    pub fn has_attempts_remaining(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait after attempt number `attempt` fails.
    ///
    /// Saturates instead of overflowing for very large attempt numbers.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = RETRY_FACTOR
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}
