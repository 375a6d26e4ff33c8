//! Configuration constants.
//!
//! This module defines the defaults used by the client: endpoint location,
//! request spacing, retry policy and batch limits.

// Endpoint
/// Default base URL of the telemetry API
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
/// Path of the real-time device query operation
///
/// This is also the first component of the signed string, so it must match
/// what the server uses when it verifies the signature.
pub const DEVICE_QUERY_ENDPOINT: &str = "/device/real/query";
/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("energygrid_client/", env!("CARGO_PKG_VERSION"));

// Rate limiting
/// Minimum spacing between two outbound requests in milliseconds
/// The server rejects bursts with 429, so the client never sends faster than 1 req/s.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1000;

// Retry strategy
/// Maximum number of attempts per batch (including the initial attempt)
/// Set to 3 = initial attempt + 2 retries
pub const RETRY_MAX_ATTEMPTS: u32 = 3;
/// Delay before the first retry in milliseconds
/// Subsequent retries double it: 1000ms, 2000ms, 4000ms, ...
pub const RETRY_INITIAL_DELAY_MS: u64 = 1000;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u32 = 2;

// Batching
/// Largest batch the server accepts in one query
pub const MAX_BATCH_SIZE: usize = 10;
/// Default batch size for a run
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Default fleet size for a run
pub const DEFAULT_TOTAL_DEVICES: usize = 500;
/// Prefix of generated serial numbers (`SN-000`, `SN-001`, ...)
pub const SERIAL_NUMBER_PREFIX: &str = "SN-";
/// Minimum number of digits in a generated serial number
pub const SERIAL_NUMBER_WIDTH: usize = 3;

// Network
/// Per-request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// Reporting
/// Decimal places kept for total and average power
pub const POWER_DECIMAL_PLACES: i32 = 2;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_UNAUTHORIZED: u16 = 401;
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
