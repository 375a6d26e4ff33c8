//! Request body and header construction for the device query.

use serde::Serialize;

use crate::config::{
    CONTENT_TYPE_JSON, HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE, HEADER_SIGNATURE,
    HEADER_TIMESTAMP,
};
use crate::models::DeviceId;
use crate::signer::SignedTimestamp;

#[derive(Serialize)]
struct QueryRequest<'a> {
    sn_list: &'a [DeviceId],
}

/// JSON body of a query: `{"sn_list": ["SN-000", ...]}`.
pub(crate) fn build_request_body(ids: &[DeviceId]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&QueryRequest { sn_list: ids })
}

/// Headers of a query: content type and length, timestamp, signature.
pub(crate) fn build_headers(signed: &SignedTimestamp, body: &str) -> Vec<(&'static str, String)> {
    vec![
        (HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON.to_string()),
        (HEADER_CONTENT_LENGTH, body.len().to_string()),
        (HEADER_TIMESTAMP, signed.timestamp.clone()),
        (HEADER_SIGNATURE, signed.signature.clone()),
    ]
}
