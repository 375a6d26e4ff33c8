//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::config::constants::{
    DEFAULT_BASE_URL, DEFAULT_BATCH_SIZE, DEFAULT_TOTAL_DEVICES, DEFAULT_USER_AGENT,
    DEVICE_QUERY_ENDPOINT, MAX_BATCH_SIZE, MIN_REQUEST_INTERVAL_MS, REQUEST_TIMEOUT_SECS,
    RETRY_INITIAL_DELAY_MS, RETRY_MAX_ATTEMPTS,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Digest used to sign requests.
///
/// The deployed server verifies MD5 signatures, so that stays the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    /// 32 hex characters
    #[default]
    Md5,
    /// 64 hex characters
    Sha256,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use energygrid_client::Config;
///
/// let config = Config {
///     token: "secret".to_string(),
///     total_devices: 50,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the telemetry API (scheme, host and port)
    ///
    /// Must not carry a path: `endpoint` is resolved against the host root.
    pub base_url: String,

    /// Path of the query endpoint, also the first part of the signed string
    pub endpoint: String,

    /// Shared secret used to sign requests
    pub token: String,

    /// Minimum spacing between requests in milliseconds
    pub min_request_interval_ms: u64,

    /// Maximum attempts per batch, including the first one
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds (doubles per retry)
    pub retry_delay_ms: u64,

    /// Largest batch the requester will send
    pub max_batch_size: usize,

    /// Number of devices to query in a run
    pub total_devices: usize,

    /// Devices per batch for a run
    pub batch_size: usize,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Digest used for request signatures
    pub signature_algorithm: SignatureAlgorithm,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEVICE_QUERY_ENDPOINT.to_string(),
            token: String::new(),
            min_request_interval_ms: MIN_REQUEST_INTERVAL_MS,
            max_retries: RETRY_MAX_ATTEMPTS,
            retry_delay_ms: RETRY_INITIAL_DELAY_MS,
            max_batch_size: MAX_BATCH_SIZE,
            total_devices: DEFAULT_TOTAL_DEVICES,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            signature_algorithm: SignatureAlgorithm::Md5,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Checks the configuration before any request is made.
    ///
    /// These are the only run-aborting errors: once a run has started, per-batch
    /// failures are recorded and the run continues.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(format!(
                "{}: unsupported scheme '{}'",
                self.base_url,
                parsed.scheme()
            )));
        }
        // The endpoint is joined as an absolute path, which would replace any prefix here.
        if !matches!(parsed.path(), "" | "/") {
            return Err(ConfigError::InvalidBaseUrl(format!(
                "{}: must not contain a path (got '{}'); set the full path with --endpoint",
                self.base_url,
                parsed.path()
            )));
        }
        if self.endpoint.is_empty() || !self.endpoint.starts_with('/') {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries);
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(0));
        }
        validate_run_shape(self.total_devices, self.batch_size, self.max_batch_size)
    }

    /// Minimum request spacing as a `Duration`.
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Base retry delay as a `Duration`.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Validates the per-run parameters against the requester's batch limit.
pub(crate) fn validate_run_shape(
    total_devices: usize,
    batch_size: usize,
    max_batch_size: usize,
) -> Result<(), ConfigError> {
    if total_devices == 0 {
        return Err(ConfigError::NoDevices);
    }
    if batch_size == 0 {
        return Err(ConfigError::InvalidBatchSize(batch_size));
    }
    if batch_size > max_batch_size {
        return Err(ConfigError::BatchSizeExceedsMaximum {
            size: batch_size,
            max: max_batch_size,
        });
    }
    Ok(())
}

/// Command-line options for the `energygrid_client` binary.
///
/// # Examples
///
/// ```bash
/// # Query the default 500 devices
/// ENERGYGRID_TOKEN=secret energygrid_client
///
/// # Smaller run against another server
/// energygrid_client --base-url http://10.0.0.5:3000 --token secret --total-devices 40
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "energygrid_client",
    about = "Fetches real-time inverter telemetry in signed, rate-limited batches and aggregates it."
)]
pub struct Opt {
    /// Base URL of the telemetry API
    #[arg(long, env = "ENERGYGRID_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Query endpoint path (also signed)
    #[arg(long, default_value = DEVICE_QUERY_ENDPOINT)]
    pub endpoint: String,

    /// Shared secret used to sign requests
    #[arg(long, env = "ENERGYGRID_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Number of devices to query (serials SN-000 upward)
    #[arg(long, default_value_t = DEFAULT_TOTAL_DEVICES)]
    pub total_devices: usize,

    /// Devices per request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Largest batch the server accepts
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub max_batch_size: usize,

    /// Minimum milliseconds between two requests
    #[arg(long, default_value_t = MIN_REQUEST_INTERVAL_MS)]
    pub min_request_interval_ms: u64,

    /// Maximum attempts per batch (including the first)
    #[arg(long, default_value_t = RETRY_MAX_ATTEMPTS)]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    #[arg(long, default_value_t = RETRY_INITIAL_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Signature digest: md5|sha256
    #[arg(long, value_enum, default_value_t = SignatureAlgorithm::Md5)]
    pub signature_algorithm: SignatureAlgorithm,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            base_url: opt.base_url,
            endpoint: opt.endpoint,
            token: opt.token,
            min_request_interval_ms: opt.min_request_interval_ms,
            max_retries: opt.max_retries,
            retry_delay_ms: opt.retry_delay_ms,
            max_batch_size: opt.max_batch_size,
            total_devices: opt.total_devices,
            batch_size: opt.batch_size,
            timeout_seconds: opt.timeout_seconds,
            user_agent: opt.user_agent,
            signature_algorithm: opt.signature_algorithm,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
