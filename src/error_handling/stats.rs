//! Request statistics tracking.
//!
//! This module provides thread-safe counters for the requests issued by a
//! `RetryingRequester`, plus a per-category count of failed attempts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use strum::IntoEnumIterator;

use super::types::ErrorType;

/// Thread-safe request statistics tracker.
///
/// Counters only grow during a run. Callers read them through `snapshot()`,
/// never through the atomics directly.
///
/// # Counters
///
/// - **total_requests**: every attempt, including retries
/// - **successful_requests**: attempts that returned 2xx and a parsable body
/// - **failed_requests**: batches whose fetch gave up (one per failed batch)
/// - **retried_requests**: attempts that were followed by a backoff and another attempt
///
/// # Thread Safety
///
/// This struct is thread-safe and can be shared across multiple tasks using `Arc`.
pub struct RequestStats {
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    retried_requests: AtomicUsize,
    total_devices: AtomicUsize,
    errors: HashMap<ErrorType, AtomicUsize>,
}

/// Point-in-time copy of `RequestStats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatsSnapshot {
    /// Every attempt, including retries
    pub total_requests: usize,
    /// Attempts that succeeded
    pub successful_requests: usize,
    /// Fetches that gave up
    pub failed_requests: usize,
    /// Attempts that were retried
    pub retried_requests: usize,
    /// Devices aggregated by the last completed run
    pub total_devices: usize,
}

impl RequestStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        RequestStats {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            retried_requests: AtomicUsize::new(0),
            total_devices: AtomicUsize::new(0),
            errors,
        }
    }

    pub fn record_attempt(&self) {
        self.total_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_success(&self) {
        self.successful_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_retry(&self) {
        self.retried_requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Stores the device count of the run that just finished.
    pub fn set_total_devices(&self, total: usize) {
        self.total_devices.store(total, Ordering::SeqCst);
    }

    /// Increment an error category counter.
    ///
    /// All categories are created in `new()`, so a missing entry is a bug; it is
    /// logged rather than turned into a panic.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in RequestStats initialization.",
                error
            );
        }
    }

    /// Get the count for an error category.
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Sum of all error category counters.
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> RequestStatsSnapshot {
        RequestStatsSnapshot {
            total_requests: self.total_requests.load(Ordering::SeqCst),
            successful_requests: self.successful_requests.load(Ordering::SeqCst),
            failed_requests: self.failed_requests.load(Ordering::SeqCst),
            retried_requests: self.retried_requests.load(Ordering::SeqCst),
            total_devices: self.total_devices.load(Ordering::SeqCst),
        }
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}
