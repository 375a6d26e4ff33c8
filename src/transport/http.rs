//! reqwest-backed transport.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::{Transport, TransportResponse};
use crate::error_handling::TransportError;

/// Sends queries to `base_url` with a shared `reqwest::Client`.
pub struct HttpTransport {
    client: Arc<reqwest::Client>,
    base_url: Url,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not an absolute URL.
    pub fn new(client: Arc<reqwest::Client>, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        path: &str,
        body: String,
        headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::Other(format!("Invalid request path '{path}': {e}")))?;

        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        log::trace!("POST {path} -> {status} ({} bytes)", body.len());

        Ok(TransportResponse { status, body })
    }
}
