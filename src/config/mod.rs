//! Client configuration and constants.
//!
//! This module provides:
//! - Configuration constants (intervals, retry policy, batch limits, etc.)
//! - HTTP header name constants for the signed query endpoint
//! - Library configuration and CLI option types

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel, Opt, SignatureAlgorithm};
pub(crate) use types::validate_run_shape;
