//! Scripted transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;

use super::{Transport, TransportResponse};
use crate::error_handling::TransportError;

/// One request as seen by the fake.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub path: String,
    pub ids: Vec<String>,
    pub headers: Vec<(&'static str, String)>,
    pub at: Instant,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

type Handler =
    dyn Fn(&RecordedRequest, usize) -> Result<TransportResponse, TransportError> + Send + Sync;

/// Answers each request with a handler given the request and its call index.
pub(crate) struct FakeTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&RecordedRequest, usize) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replays `responses` in order, repeating the last one once exhausted.
    pub fn scripted(responses: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self::new(move |_, call| {
            responses
                .get(call)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Other("no scripted response".into())))
        })
    }

    /// Answers every request with one online record per requested id.
    pub fn always_ok() -> Self {
        Self::new(|req, _| Ok(ok_for(&req.ids)))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(
        &self,
        path: &str,
        body: String,
        headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
        let ids = parsed["sn_list"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let request = RecordedRequest {
            path: path.to_string(),
            ids,
            headers: headers.to_vec(),
            at: Instant::now(),
        };

        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.handler)(&request, call)
    }
}

/// 2xx response with one `Online`, 1.0 kW record per id.
pub(crate) fn ok_for(ids: &[String]) -> TransportResponse {
    let data: Vec<serde_json::Value> = ids
        .iter()
        .map(|sn| {
            json!({
                "sn": sn,
                "status": "Online",
                "power": "1.0 kW",
                "last_updated": "2024-01-01T00:00:00Z"
            })
        })
        .collect();
    TransportResponse {
        status: 200,
        body: json!({ "data": data }).to_string(),
    }
}

/// Error response with `{"error": message}`.
pub(crate) fn error_response(status: u16, message: &str) -> TransportResponse {
    TransportResponse {
        status,
        body: json!({ "error": message }).to_string(),
    }
}

/// 2xx response with an explicit record list.
pub(crate) fn ok_with(records: serde_json::Value) -> TransportResponse {
    TransportResponse {
        status: 200,
        body: json!({ "data": records }).to_string(),
    }
}
