//! Statistics logging at the end of a run.

use log::info;
use strum::IntoEnumIterator;

use crate::aggregator::AggregateReport;
use crate::error_handling::{ErrorType, RequestStats};

/// Logs the report summary followed by the per-category failure counts.
pub fn log_final_statistics(report: &AggregateReport, request_stats: &RequestStats) {
    let stats = &report.stats;
    info!(
        "Request statistics: total={}, successful={}, failed={}, retried={}",
        stats.total_requests, stats.successful_requests, stats.failed_requests, stats.retried_requests
    );

    log_request_statistics(request_stats);

    for failed in &report.summary.failed_batches {
        info!(
            "   Failed batch {} ({} devices): {}",
            failed.batch_index,
            failed.devices.len(),
            failed.error
        );
    }

    print_simple_summary(report);
}

/// Prints a simple one-line summary of the run.
///
/// Works with both plain and JSON log formats (log::info! handles formatting).
fn print_simple_summary(report: &AggregateReport) {
    let summary = &report.summary;
    let elapsed_seconds = report.metadata.duration_ms as f64 / 1000.0;
    info!(
        "✅ Aggregated {} device{} ({} online, {} offline, {:.2} kW total, {:.2} kW average) in {:.1}s - {} of {} batches failed",
        summary.total,
        if summary.total == 1 { "" } else { "s" },
        summary.online,
        summary.offline,
        summary.total_power,
        summary.average_power,
        elapsed_seconds,
        summary.failed_batches.len(),
        report.metadata.batches_total
    );
}

/// Logs the count of each failure category that occurred.
///
/// Failed attempts that were later retried successfully are included.
pub fn log_request_statistics(request_stats: &RequestStats) {
    let total_errors = request_stats.total_errors();

    if total_errors > 0 {
        info!("Failed attempt counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = request_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::aggregator::{FailedBatch, RunMetadata, RunSummary};
    use crate::error_handling::RequestStatsSnapshot;
    use crate::models::DeviceId;

    fn report(failed_batches: Vec<FailedBatch>) -> AggregateReport {
        AggregateReport {
            devices: Vec::new(),
            summary: RunSummary {
                total: 10,
                online: 7,
                offline: 3,
                total_power: 21.5,
                average_power: 2.15,
                failed_batches,
            },
            metadata: RunMetadata {
                started_at: Utc::now(),
                completed_at: Utc::now(),
                duration_ms: 2500,
                batches_total: 2,
                batches_completed: 1,
            },
            stats: RequestStatsSnapshot::default(),
        }
    }

    #[test]
    fn test_log_request_statistics_no_errors() {
        let stats = RequestStats::new();
        // Should not panic when there are no errors
        log_request_statistics(&stats);
    }

    #[test]
    fn test_log_request_statistics_with_errors() {
        let stats = RequestStats::new();
        stats.increment_error(ErrorType::TooManyRequests);
        stats.increment_error(ErrorType::TooManyRequests);
        stats.increment_error(ErrorType::Timeout);
        log_request_statistics(&stats);
        assert_eq!(stats.total_errors(), 3);
    }

    #[test]
    fn test_log_final_statistics_with_failed_batches() {
        let stats = RequestStats::new();
        stats.increment_error(ErrorType::NotFound);
        let report = report(vec![FailedBatch {
            batch_index: 1,
            devices: vec![DeviceId::from("SN-010")],
            error: "Request failed: Not Found (HTTP 404)".to_string(),
            status: Some(404),
        }]);
        // Should handle failed batches and error counts together
        log_final_statistics(&report, &stats);
    }
}
