//! Error handling and request statistics.
//!
//! This module provides:
//! - Error type definitions for configuration, signing, transport and fetch failures
//! - Categorization of failed attempts by HTTP status or transport failure
//! - Request statistics tracking (attempts, successes, failures, retries)
//!
//! Only `FetchError` crosses from the requester into the aggregator; everything
//! else is either fatal configuration (`ConfigError`) or setup (`InitializationError`).

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_status, categorize_transport_error};
pub use stats::{RequestStats, RequestStatsSnapshot};
pub use types::{
    BatchValidationError, ConfigError, ErrorType, FetchError, InitializationError, SignerError,
    TransportError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_request_stats_initialization() {
        let stats = RequestStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        assert_eq!(stats.snapshot(), RequestStatsSnapshot::default());
    }

    #[test]
    fn test_error_categories_are_counted_independently() {
        let stats = RequestStats::new();
        stats.increment_error(categorize_status(429));
        stats.increment_error(categorize_status(503));
        stats.increment_error(categorize_status(500));
        stats.increment_error(categorize_transport_error(&TransportError::Timeout(
            "deadline".into(),
        )));

        assert_eq!(stats.get_error_count(ErrorType::TooManyRequests), 1);
        assert_eq!(stats.get_error_count(ErrorType::ServerError), 2);
        assert_eq!(stats.get_error_count(ErrorType::Timeout), 1);
        assert_eq!(stats.total_errors(), 4);
    }
}
