//! HTTP header name constants.
//!
//! The query endpoint authenticates each request from two custom headers: the
//! request timestamp and the signature derived from it.

/// Epoch-millisecond timestamp the signature was computed for
pub const HEADER_TIMESTAMP: &str = "timestamp";
/// Hex digest of `endpoint || token || timestamp`
pub const HEADER_SIGNATURE: &str = "signature";
/// Content type of the request body
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// Byte length of the request body
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";

/// Content type sent with every query.
pub const CONTENT_TYPE_JSON: &str = "application/json";
