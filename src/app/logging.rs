//! Progress logging utilities.

use log::info;
use tokio::time::Instant;

/// Logs progress information about batch processing.
///
/// # Arguments
///
/// * `start_time` - The start time of the run
/// * `completed_batches` - Batches processed so far, failed ones included
/// * `total_batches` - Batches in the run
pub fn log_progress(start_time: Instant, completed_batches: usize, total_batches: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        completed_batches as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {}/{} batches in {:.2} seconds (~{:.2} batches/sec)",
        completed_batches, total_batches, elapsed_secs, rate
    );
}
