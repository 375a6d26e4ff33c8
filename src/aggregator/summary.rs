//! Report types and the running summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::POWER_DECIMAL_PLACES;
use crate::error_handling::RequestStatsSnapshot;
use crate::models::{DeviceId, DeviceRecord, DeviceStatus};

/// A batch whose fetch gave up. It is not retried after the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedBatch {
    pub batch_index: usize,
    pub devices: Vec<DeviceId>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Device counts and power totals for a run.
///
/// Built incrementally with `record` and closed with `finalize`, after which the
/// power figures are rounded to two decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub total_power: f64,
    pub average_power: f64,
    pub failed_batches: Vec<FailedBatch>,
}

impl RunSummary {
    /// Folds one device into the running totals.
    ///
    /// A power value that is missing or not a number adds nothing.
    pub fn record(&mut self, record: &DeviceRecord) {
        self.total += 1;
        match record.status {
            DeviceStatus::Online => self.online += 1,
            DeviceStatus::Offline => self.offline += 1,
            DeviceStatus::Other(_) => {}
        }
        if let Some(power) = record.power_kw() {
            self.total_power += power;
        }
    }

    pub fn record_failure(&mut self, failed: FailedBatch) {
        self.failed_batches.push(failed);
    }

    /// Computes the average and rounds both power figures.
    ///
    /// With no devices both stay at 0.
    pub fn finalize(&mut self) {
        if self.total == 0 {
            self.total_power = 0.0;
            self.average_power = 0.0;
            return;
        }
        let average = self.total_power / self.total as f64;
        self.total_power = round_power(self.total_power);
        self.average_power = round_power(average);
    }
}

/// Rounds to `POWER_DECIMAL_PLACES` decimals.
pub fn round_power(value: f64) -> f64 {
    let scale = 10f64.powi(POWER_DECIMAL_PLACES);
    (value * scale).round() / scale
}

/// Timing and batch bookkeeping for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub batches_total: usize,
    pub batches_completed: usize,
}

/// Everything a run produced.
///
/// `batches_completed + failed_batches.len() == batches_total` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    /// Every record received, in batch order
    pub devices: Vec<DeviceRecord>,
    pub summary: RunSummary,
    pub metadata: RunMetadata,
    /// Request counters at the end of the run
    pub stats: RequestStatsSnapshot,
}

impl AggregateReport {
    /// Whether at least one batch failed.
    pub fn is_partial(&self) -> bool {
        !self.summary.failed_batches.is_empty()
    }
}
