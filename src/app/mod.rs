//! Run-level logging helpers.
//!
//! This module provides progress logging while batches are fetched and the
//! final request statistics once a run is over.

pub mod logging;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use statistics::log_final_statistics;
