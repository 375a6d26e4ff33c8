//! Categorization of failed attempts.

use super::types::{ErrorType, TransportError};
use crate::config::{HTTP_STATUS_NOT_FOUND, HTTP_STATUS_TOO_MANY_REQUESTS, HTTP_STATUS_UNAUTHORIZED};

/// Maps a non-success HTTP status to an `ErrorType`.
pub fn categorize_status(status: u16) -> ErrorType {
    match status {
        HTTP_STATUS_TOO_MANY_REQUESTS => ErrorType::TooManyRequests,
        HTTP_STATUS_UNAUTHORIZED => ErrorType::Unauthorized,
        HTTP_STATUS_NOT_FOUND => ErrorType::NotFound,
        500..=599 => ErrorType::ServerError,
        _ => ErrorType::ClientError,
    }
}

/// Maps a transport failure to an `ErrorType`.
pub fn categorize_transport_error(error: &TransportError) -> ErrorType {
    match error {
        TransportError::Connect(_) => ErrorType::Connect,
        TransportError::Timeout(_) => ErrorType::Timeout,
        TransportError::Other(_) => ErrorType::Network,
    }
}
