//! Classification of one transport attempt.

use serde::Deserialize;

use crate::error_handling::{
    categorize_status, categorize_transport_error, ErrorType, TransportError,
};
use crate::models::DeviceRecord;
use crate::transport::TransportResponse;

/// Success body: `{"data": [...]}`.
///
/// Elements are decoded one by one with `DeviceRecord::from_wire`, so an odd
/// record never fails the body; only a missing or non-array `data` does.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    pub data: Vec<serde_json::Value>,
}

/// Failure body, when the server sends one: `{"error": "..."}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

const UNKNOWN_ERROR: &str = "Unknown error";

/// Result of a single attempt. Exactly one of success or failure.
#[derive(Debug)]
pub enum RequestOutcome {
    /// 2xx with a well-formed body.
    Success {
        records: Vec<DeviceRecord>,
        status: u16,
    },
    /// Anything else. `status` is `None` when the server never produced a
    /// usable answer (connection failure, timeout, malformed success body).
    Failure {
        error: String,
        status: Option<u16>,
        category: ErrorType,
    },
}

impl RequestOutcome {
    pub(crate) fn from_response(response: TransportResponse) -> Self {
        let status = response.status;
        if (200..300).contains(&status) {
            return match serde_json::from_str::<QueryResponse>(&response.body) {
                Ok(parsed) => RequestOutcome::Success {
                    records: parsed.data.into_iter().map(DeviceRecord::from_wire).collect(),
                    status,
                },
                Err(e) => RequestOutcome::Failure {
                    error: format!("Failed to parse response: {e}"),
                    status: None,
                    category: ErrorType::Decode,
                },
            };
        }

        // Error bodies are informative only; an unreadable one still fails on its status.
        let error = serde_json::from_str::<ErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        RequestOutcome::Failure {
            error,
            status: Some(status),
            category: categorize_status(status),
        }
    }

    pub(crate) fn from_transport_error(error: &TransportError) -> Self {
        RequestOutcome::Failure {
            error: error.to_string(),
            status: None,
            category: categorize_transport_error(error),
        }
    }
}
