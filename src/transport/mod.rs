//! Transport boundary.
//!
//! The request engine only needs one primitive: send a body with some headers
//! to a path and get back a status code and a body. `HttpTransport` implements
//! it over reqwest; tests substitute scripted implementations.

mod http;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::error_handling::TransportError;

pub use http::HttpTransport;

/// Raw answer from the server. Any status, including errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// A black-box POST primitive.
///
/// Implementations report only failures below HTTP (connection, timeout,
/// unreadable body) as `Err`; every status code the server sends is an `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        path: &str,
        body: String,
        headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError>;
}
