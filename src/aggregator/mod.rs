//! Run orchestration.
//!
//! The `Aggregator` drives every batch of a run through one `RetryingRequester`,
//! strictly in order, and folds the results into an `AggregateReport`. A failed
//! batch is recorded and the run moves on; only configuration errors stop a run.

mod summary;

use chrono::Utc;
use log::{error, info};
use tokio::time::Instant;

use crate::app::log_progress;
use crate::batch::{generate_device_ids, partition};
use crate::config::validate_run_shape;
use crate::error_handling::ConfigError;
use crate::fetch::RetryingRequester;
use crate::models::DeviceId;

pub use summary::{round_power, AggregateReport, FailedBatch, RunMetadata, RunSummary};

/// Aggregates telemetry for a whole fleet.
pub struct Aggregator {
    requester: RetryingRequester,
}

impl Aggregator {
    pub fn new(requester: RetryingRequester) -> Self {
        Self { requester }
    }

    /// Queries `total_devices` generated serial numbers (`SN-000` upward) in
    /// batches of `batch_size`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `total_devices` is 0, or if `batch_size` is 0 or
    /// larger than the requester's maximum. Failed batches are not errors; they
    /// are listed in the report.
    pub async fn run(
        &self,
        total_devices: usize,
        batch_size: usize,
    ) -> Result<AggregateReport, ConfigError> {
        validate_run_shape(total_devices, batch_size, self.requester.max_batch_size())?;
        let ids = generate_device_ids(total_devices);
        self.run_with_ids(&ids, batch_size).await
    }

    /// Queries an explicit list of identifiers in batches of `batch_size`.
    ///
    /// # Errors
    ///
    /// Same as [`Aggregator::run`], with `ids` empty standing in for zero devices.
    pub async fn run_with_ids(
        &self,
        ids: &[DeviceId],
        batch_size: usize,
    ) -> Result<AggregateReport, ConfigError> {
        validate_run_shape(ids.len(), batch_size, self.requester.max_batch_size())?;
        let batches = partition(ids, batch_size)?;
        let batches_total = batches.len();

        let started_at = Utc::now();
        let start_time = Instant::now();
        info!(
            "Fetching {} devices in {} batches of up to {}",
            ids.len(),
            batches_total,
            batch_size
        );

        let mut summary = RunSummary::default();
        let mut devices = Vec::with_capacity(ids.len());
        let mut batches_completed = 0;

        for batch in &batches {
            let position = batch.index + 1;
            match self.requester.fetch(batch).await {
                Ok(records) => {
                    for record in &records {
                        summary.record(record);
                    }
                    info!(
                        "[{position}/{batches_total}] Batch {} completed: {} devices",
                        batch.index,
                        records.len()
                    );
                    devices.extend(records);
                    batches_completed += 1;
                }
                Err(e) => {
                    error!(
                        "[{position}/{batches_total}] Batch {} failed: {e}",
                        batch.index
                    );
                    summary.record_failure(FailedBatch {
                        batch_index: batch.index,
                        devices: batch.ids.clone(),
                        error: e.to_string(),
                        status: e.status(),
                    });
                }
            }
            log_progress(start_time, position, batches_total);
        }

        summary.finalize();

        let stats = self.requester.request_stats();
        stats.set_total_devices(summary.total);

        let metadata = RunMetadata {
            started_at,
            completed_at: Utc::now(),
            duration_ms: u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX),
            batches_total,
            batches_completed,
        };
        info!(
            "Run finished: {} devices ({} online, {} offline), {}/{} batches completed",
            summary.total, summary.online, summary.offline, batches_completed, batches_total
        );

        Ok(AggregateReport {
            devices,
            summary,
            metadata,
            stats: stats.snapshot(),
        })
    }
}
