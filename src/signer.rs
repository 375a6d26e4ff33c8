//! Request signing.
//!
//! Every query carries a `timestamp` header and a `signature` header. The
//! signature is the hex digest of `endpoint || token || timestamp`, which the
//! server recomputes with its copy of the token.

use std::fmt;

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::config::SignatureAlgorithm;
use crate::error_handling::SignerError;

/// A timestamp and the signature computed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTimestamp {
    pub timestamp: String,
    pub signature: String,
}

/// Computes the signature for one request.
///
/// Pure and deterministic: the same inputs always produce the same lowercase hex
/// string (32 characters for MD5, 64 for SHA-256).
///
/// # Errors
///
/// Returns `SignerError` if `endpoint_path` or `shared_secret` is empty.
pub fn sign(
    endpoint_path: &str,
    shared_secret: &str,
    timestamp: &str,
    algorithm: SignatureAlgorithm,
) -> Result<String, SignerError> {
    if endpoint_path.is_empty() {
        return Err(SignerError::EmptyPath);
    }
    if shared_secret.is_empty() {
        return Err(SignerError::EmptySecret);
    }
    Ok(digest_hex(endpoint_path, shared_secret, timestamp, algorithm))
}

fn digest_hex(path: &str, secret: &str, timestamp: &str, algorithm: SignatureAlgorithm) -> String {
    match algorithm {
        SignatureAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            hasher.update(path.as_bytes());
            hasher.update(secret.as_bytes());
            hasher.update(timestamp.as_bytes());
            hex::encode(hasher.finalize())
        }
        SignatureAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(path.as_bytes());
            hasher.update(secret.as_bytes());
            hasher.update(timestamp.as_bytes());
            hex::encode(hasher.finalize())
        }
    }
}

/// Current wall-clock time as decimal epoch milliseconds.
pub fn timestamp_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Signs requests for one endpoint with one shared secret.
///
/// Inputs are checked once at construction, so signing afterwards cannot fail.
#[derive(Clone)]
pub struct Signer {
    endpoint: String,
    secret: String,
    algorithm: SignatureAlgorithm,
}

impl Signer {
    /// # Errors
    ///
    /// Returns `SignerError` if `endpoint` or `secret` is empty.
    pub fn new(
        endpoint: impl Into<String>,
        secret: impl Into<String>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, SignerError> {
        let endpoint = endpoint.into();
        let secret = secret.into();
        if endpoint.is_empty() {
            return Err(SignerError::EmptyPath);
        }
        if secret.is_empty() {
            return Err(SignerError::EmptySecret);
        }
        Ok(Self {
            endpoint,
            secret,
            algorithm,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Signature for an explicit timestamp.
    pub fn sign(&self, timestamp: &str) -> String {
        digest_hex(&self.endpoint, &self.secret, timestamp, self.algorithm)
    }

    /// Takes a fresh timestamp and signs it.
    ///
    /// Called once per attempt: a retried request must not reuse the timestamp of
    /// the attempt before it.
    pub fn sign_now(&self) -> SignedTimestamp {
        let timestamp = timestamp_millis();
        let signature = self.sign(&timestamp);
        SignedTimestamp {
            timestamp,
            signature,
        }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("endpoint", &self.endpoint)
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
