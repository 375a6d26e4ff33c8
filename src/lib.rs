//! energygrid_client library: batched, signed, rate-limited telemetry queries
//!
//! This library fetches real-time telemetry for a fleet of inverters from an API
//! that accepts at most ten serial numbers per request, at most one request per
//! second, and only requests signed with a shared token. Devices are split into
//! batches, each batch is fetched with retry and exponential backoff, and the
//! results are folded into a single `AggregateReport`. A batch that cannot be
//! fetched is listed in the report instead of aborting the run.
//!
//! # Example
//!
//! ```no_run
//! use energygrid_client::{run_aggregation, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     token: "interview_token_123".to_string(),
//!     total_devices: 50,
//!     ..Default::default()
//! };
//!
//! let report = run_aggregation(config).await?;
//! println!("{} devices, {:.2} kW total, {} failed batches",
//!          report.summary.total, report.summary.total_power,
//!          report.summary.failed_batches.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod aggregator;
mod app;
mod batch;
pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod models;
mod rate_limiter;
mod signer;
pub mod transport;

// Re-export public API
pub use aggregator::{
    round_power, AggregateReport, Aggregator, FailedBatch, RunMetadata, RunSummary,
};
pub use batch::{generate_device_ids, partition, Batch};
pub use config::{Config, LogFormat, LogLevel, Opt, SignatureAlgorithm};
pub use error_handling::{
    BatchValidationError, ConfigError, ErrorType, FetchError, InitializationError,
    RequestStats, RequestStatsSnapshot, SignerError, TransportError,
};
pub use fetch::{is_retriable_status, RequestOutcome, RetryPolicy, RetryingRequester};
pub use models::{parse_power, DeviceId, DeviceRecord, DeviceStatus};
pub use rate_limiter::RateLimiter;
pub use run::run_aggregation;
pub use signer::{sign, timestamp_millis, SignedTimestamp, Signer};

// Internal run module (wires configuration, HTTP client and aggregator together)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;

    use crate::aggregator::{AggregateReport, Aggregator};
    use crate::app::log_final_statistics;
    use crate::config::Config;
    use crate::error_handling::InitializationError;
    use crate::fetch::RetryingRequester;
    use crate::initialization::init_client;
    use crate::transport::{HttpTransport, Transport};

    /// Runs one aggregation with the provided configuration.
    ///
    /// This is the main entry point for the library. It validates the
    /// configuration, builds the HTTP client, queries `config.total_devices`
    /// devices in batches of `config.batch_size`, logs the final statistics and
    /// returns the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client cannot
    /// be built. Failed batches are not errors; see `RunSummary::failed_batches`.
    pub async fn run_aggregation(config: Config) -> Result<AggregateReport> {
        config.validate().context("Invalid configuration")?;

        let client = init_client(&config)
            .map_err(InitializationError::from)
            .context("Failed to initialize HTTP client")?;
        let transport: Arc<dyn Transport> = Arc::new(
            HttpTransport::new(client, &config.base_url)
                .with_context(|| format!("Invalid base URL: {}", config.base_url))?,
        );

        let requester = RetryingRequester::from_config(&config, transport)
            .context("Failed to configure requester")?;
        let request_stats = requester.request_stats();
        let aggregator = Aggregator::new(requester);

        info!(
            "Querying {} devices at {}{} (batch size {}, {}ms between requests)",
            config.total_devices,
            config.base_url.trim_end_matches('/'),
            config.endpoint,
            config.batch_size,
            config.min_request_interval_ms
        );

        let report = aggregator
            .run(config.total_devices, config.batch_size)
            .await
            .context("Aggregation run rejected")?;

        log_final_statistics(&report, &request_stats);

        Ok(report)
    }
}
