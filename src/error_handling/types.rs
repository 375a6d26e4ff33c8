//! Error type definitions.
//!
//! This module defines all error types and failure categories used throughout the client.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Configuration errors, detected before any batch is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL does not parse or is not http(s).
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Endpoint path is empty or not absolute.
    #[error("Invalid endpoint path '{0}': must start with '/'")]
    InvalidEndpoint(String),

    /// No shared secret configured.
    #[error("Missing API token (set --token or ENERGYGRID_TOKEN)")]
    MissingToken,

    /// At least one attempt per batch is required.
    #[error("Maximum retries must be at least 1")]
    InvalidMaxRetries,

    /// Batch size must be positive.
    #[error("Invalid batch size {0}: must be at least 1")]
    InvalidBatchSize(usize),

    /// Batch size is larger than the server accepts.
    #[error("Batch size {size} exceeds the maximum of {max} devices")]
    BatchSizeExceedsMaximum {
        /// Requested batch size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// A run needs at least one device.
    #[error("Total devices must be at least 1")]
    NoDevices,
}

/// Caller errors when computing a signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// Endpoint path was empty.
    #[error("Cannot sign an empty endpoint path")]
    EmptyPath,

    /// Shared secret was empty.
    #[error("Cannot sign with an empty secret")]
    EmptySecret,
}

/// A batch the requester refuses to send.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchValidationError {
    /// No identifiers.
    #[error("serial numbers must be a non-empty list")]
    Empty,

    /// More identifiers than the server accepts.
    #[error("batch size {size} cannot exceed {max} devices")]
    TooLarge {
        /// Number of identifiers in the batch
        size: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Failure below the HTTP layer. Always retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established or was reset.
    #[error("Connection error: {0}")]
    Connect(String),

    /// The request did not complete within the timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other failure sending the request or reading the body.
    #[error("Transport error: {0}")]
    Other(String),
}

/// Error returned by a batch fetch.
///
/// This is the only error the aggregator sees; it is recorded against the batch
/// and never aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The batch was rejected before sending. No attempt was made.
    #[error("Invalid batch: {0}")]
    Validation(#[from] BatchValidationError),

    /// The server answered with a non-success status (permanent, or retries exhausted).
    #[error("Request failed: {message} (HTTP {status})")]
    Http {
        /// Final HTTP status code
        status: u16,
        /// `error` field of the response body, or "Unknown error"
        message: String,
    },

    /// Transport or response-parsing failure after all attempts.
    #[error("Network error: {0}")]
    Network(String),
}

impl FetchError {
    /// HTTP status of the final attempt, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Categories of failed attempts.
///
/// Each failed attempt (including ones that are later retried successfully)
/// increments exactly one category in `RequestStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// 429 Too Many Requests
    TooManyRequests,
    /// Any 5xx
    ServerError,
    /// 401 Unauthorized (usually a bad signature or token)
    Unauthorized,
    /// 404 Not Found
    NotFound,
    /// Any other non-2xx status
    ClientError,
    /// Connection failures
    Connect,
    /// Request timeouts
    Timeout,
    /// Other transport failures
    Network,
    /// Response body was not the expected JSON
    Decode,
}

impl ErrorType {
    /// Human-readable label for statistics output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::TooManyRequests => "HTTP 429 Too Many Requests",
            ErrorType::ServerError => "HTTP 5xx server error",
            ErrorType::Unauthorized => "HTTP 401 Unauthorized",
            ErrorType::NotFound => "HTTP 404 Not Found",
            ErrorType::ClientError => "HTTP client error",
            ErrorType::Connect => "Connection error",
            ErrorType::Timeout => "Timeout",
            ErrorType::Network => "Network error",
            ErrorType::Decode => "Malformed response",
        }
    }
}
