//! Minimum-interval rate limiter.
//!
//! The telemetry API answers 429 when two queries arrive less than a second
//! apart, so every outbound request passes through a single `RateLimiter`.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces request grants at least `min_interval` apart.
///
/// # Behavior
///
/// - The first grant is immediate
/// - A later grant waits for whatever remains of `min_interval` since the previous grant
/// - The check, the wait and the update happen while holding one async mutex, so
///   concurrent callers queue up and are granted one at a time, in arrival order
/// - A zero interval disables spacing but callers are still serialized
pub struct RateLimiter {
    min_interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Waits until a request may be sent, then records the grant.
    ///
    /// Returns the instant of the grant.
    pub async fn acquire(&self) -> Instant {
        let mut last_grant = self.last_grant.lock().await;

        if let Some(previous) = *last_grant {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                log::debug!("Rate limiter: waiting {}ms before next request", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }

        let now = Instant::now();
        *last_grant = Some(now);
        now
    }
}
