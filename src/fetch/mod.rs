//! Batch fetching with rate limiting, signing and retry.
//!
//! `RetryingRequester::fetch` turns one batch into one logical request:
//! - the batch is validated before anything is sent
//! - every attempt waits for the shared `RateLimiter` and is signed with a fresh timestamp
//! - 429, 5xx and transport failures are retried with exponential backoff
//! - any other status fails the batch immediately
//!
//! The retry loop is bounded by `RetryPolicy::max_attempts`; there is no retrying
//! above this level.

mod outcome;
mod request;
mod retry;

use std::sync::Arc;

use log::{debug, warn};

use crate::batch::Batch;
use crate::config::Config;
use crate::error_handling::{
    BatchValidationError, ConfigError, ErrorType, FetchError, RequestStats,
    RequestStatsSnapshot, SignerError,
};
use crate::models::DeviceRecord;
use crate::rate_limiter::RateLimiter;
use crate::signer::Signer;
use crate::transport::Transport;

pub use outcome::RequestOutcome;
pub use retry::{is_retriable_status, RetryPolicy};

use request::{build_headers, build_request_body};

/// Issues batch queries through a rate limiter and a transport, retrying
/// transient failures.
///
/// Owns its `RequestStats`; callers read them through `stats()`.
pub struct RetryingRequester {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    signer: Signer,
    policy: RetryPolicy,
    max_batch_size: usize,
    stats: Arc<RequestStats>,
}

impl RetryingRequester {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        signer: Signer,
        policy: RetryPolicy,
        max_batch_size: usize,
    ) -> Self {
        Self {
            transport,
            limiter,
            signer,
            policy,
            max_batch_size,
            stats: Arc::new(RequestStats::new()),
        }
    }

    /// Builds a requester with its own rate limiter from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        config.validate()?;
        let signer = Signer::new(
            config.endpoint.as_str(),
            config.token.as_str(),
            config.signature_algorithm,
        )
        .map_err(|e| match e {
            SignerError::EmptyPath => ConfigError::InvalidEndpoint(config.endpoint.clone()),
            SignerError::EmptySecret => ConfigError::MissingToken,
        })?;
        let limiter = Arc::new(RateLimiter::new(config.min_request_interval()));
        let policy = RetryPolicy::new(config.max_retries, config.retry_delay());
        Ok(Self::new(
            transport,
            limiter,
            signer,
            policy,
            config.max_batch_size,
        ))
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Snapshot of the request counters.
    pub fn stats(&self) -> RequestStatsSnapshot {
        self.stats.snapshot()
    }

    /// Shared handle to the live counters (error categories included).
    pub fn request_stats(&self) -> Arc<RequestStats> {
        Arc::clone(&self.stats)
    }

    /// Checks that a batch may be sent.
    pub fn validate_batch(&self, batch: &Batch) -> Result<(), BatchValidationError> {
        if batch.is_empty() {
            return Err(BatchValidationError::Empty);
        }
        if batch.len() > self.max_batch_size {
            return Err(BatchValidationError::TooLarge {
                size: batch.len(),
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    /// Fetches the records for one batch.
    ///
    /// # Errors
    ///
    /// - `FetchError::Validation` if the batch is empty or too large; no attempt is made
    ///   and no counter changes
    /// - `FetchError::Http` for a permanent status, or a retriable one on the last attempt
    /// - `FetchError::Network` if the last attempt failed below HTTP or returned a
    ///   malformed success body
    pub async fn fetch(&self, batch: &Batch) -> Result<Vec<DeviceRecord>, FetchError> {
        self.validate_batch(batch)?;

        let mut attempt: u32 = 1;
        loop {
            self.stats.record_attempt();

            match self.attempt(batch).await {
                RequestOutcome::Success { records, status } => {
                    self.stats.record_success();
                    debug!(
                        "Batch {} attempt {attempt}: HTTP {status}, {} records",
                        batch.index,
                        records.len()
                    );
                    return Ok(records);
                }
                RequestOutcome::Failure {
                    error,
                    status,
                    category,
                } => {
                    self.stats.increment_error(category);

                    // A status from the server decides; no status means a network-class failure.
                    let retriable = status.map_or(true, is_retriable_status);
                    if retriable && self.policy.has_attempts_remaining(attempt) {
                        self.stats.record_retry();
                        let delay = self.policy.delay_for(attempt);
                        match status {
                            Some(code) => warn!(
                                "Batch {} attempt {attempt} failed ({code}: {error}). Retrying in {}ms...",
                                batch.index,
                                delay.as_millis()
                            ),
                            None => warn!(
                                "Batch {} network error on attempt {attempt}: {error}. Retrying in {}ms...",
                                batch.index,
                                delay.as_millis()
                            ),
                        }
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    self.stats.record_failure();
                    return Err(match status {
                        Some(status) => FetchError::Http {
                            status,
                            message: error,
                        },
                        None => FetchError::Network(error),
                    });
                }
            }
        }
    }

    /// One attempt: wait for the limiter, sign, send, classify.
    async fn attempt(&self, batch: &Batch) -> RequestOutcome {
        self.limiter.acquire().await;

        let body = match build_request_body(&batch.ids) {
            Ok(body) => body,
            Err(e) => {
                return RequestOutcome::Failure {
                    error: format!("Failed to encode request: {e}"),
                    status: None,
                    category: ErrorType::Decode,
                }
            }
        };
        let signed = self.signer.sign_now();
        let headers = build_headers(&signed, &body);

        match self
            .transport
            .send(self.signer.endpoint(), body, &headers)
            .await
        {
            Ok(response) => RequestOutcome::from_response(response),
            Err(e) => RequestOutcome::from_transport_error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::batch::{generate_device_ids, partition};
    use crate::config::SignatureAlgorithm;
    use crate::error_handling::TransportError;
    use crate::signer;
    use crate::transport::fake::{error_response, ok_for, FakeTransport};

    const ENDPOINT: &str = "/device/real/query";
    const TOKEN: &str = "interview_token_123";

    fn requester_with(
        transport: Arc<FakeTransport>,
        max_attempts: u32,
        base_delay: Duration,
        min_interval: Duration,
    ) -> RetryingRequester {
        RetryingRequester::new(
            transport,
            Arc::new(RateLimiter::new(min_interval)),
            Signer::new(ENDPOINT, TOKEN, SignatureAlgorithm::Md5).unwrap(),
            RetryPolicy::new(max_attempts, base_delay),
            10,
        )
    }

    fn first_batch(n: usize) -> Batch {
        partition(&generate_device_ids(n), 10).unwrap().remove(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_records() {
        let transport = Arc::new(FakeTransport::always_ok());
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::from_millis(1000),
        );

        let records = requester.fetch(&first_batch(10)).await.unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].sn.as_str(), "SN-000");

        let stats = requester.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.retried_requests, 0);
        assert_eq!(stats.failed_requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_is_signed_for_its_timestamp() {
        let transport = Arc::new(FakeTransport::always_ok());
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::ZERO,
        );
        requester.fetch(&first_batch(3)).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.path, ENDPOINT);
        assert_eq!(request.ids, vec!["SN-000", "SN-001", "SN-002"]);
        let timestamp = request.header("timestamp").unwrap();
        let expected = signer::sign(ENDPOINT, TOKEN, timestamp, SignatureAlgorithm::Md5).unwrap();
        assert_eq!(request.header("signature"), Some(expected.as_str()));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_500_exhausts_attempts_with_doubling_backoff() {
        let transport = Arc::new(FakeTransport::scripted(vec![Ok(error_response(
            500,
            "Internal Server Error",
        ))]));
        let requester = requester_with(
            Arc::clone(&transport),
            4,
            Duration::from_millis(1000),
            Duration::ZERO,
        );

        let err = requester.fetch(&first_batch(5)).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Http {
                status: 500,
                message: "Internal Server Error".to_string()
            }
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        let gaps: Vec<Duration> = requests
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );

        let stats = requester.stats();
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.retried_requests, 3);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.successful_requests, 0);
        assert_eq!(
            requester.request_stats().get_error_count(ErrorType::ServerError),
            4
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_429_then_success_records_one_retry() {
        let transport = Arc::new(FakeTransport::new(|req, call| {
            if call == 0 {
                Ok(error_response(429, "Too Many Requests"))
            } else {
                Ok(ok_for(&req.ids))
            }
        }));
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::from_millis(1000),
        );

        let records = requester.fetch(&first_batch(2)).await.unwrap();
        assert_eq!(records.len(), 2);

        let stats = requester.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.retried_requests, 1);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_gets_a_fresh_timestamp() {
        let transport = Arc::new(FakeTransport::new(|req, call| {
            if call < 2 {
                Ok(error_response(503, "Service Unavailable"))
            } else {
                Ok(ok_for(&req.ids))
            }
        }));
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::ZERO,
        );
        requester.fetch(&first_batch(1)).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            let timestamp = request.header("timestamp").unwrap();
            let expected =
                signer::sign(ENDPOINT, TOKEN, timestamp, SignatureAlgorithm::Md5).unwrap();
            assert_eq!(request.header("signature"), Some(expected.as_str()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_status_is_not_retried() {
        let transport = Arc::new(FakeTransport::scripted(vec![Ok(error_response(
            404,
            "Not Found",
        ))]));
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::ZERO,
        );

        let err = requester.fetch(&first_batch(3)).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(transport.call_count(), 1);

        let stats = requester.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.retried_requests, 0);
        assert_eq!(stats.failed_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_are_retried() {
        let transport = Arc::new(FakeTransport::new(|req, call| match call {
            0 => Err(TransportError::Connect("connection refused".into())),
            1 => Ok(crate::transport::TransportResponse {
                status: 200,
                body: "not json".to_string(),
            }),
            _ => Ok(ok_for(&req.ids)),
        }));
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::ZERO,
        );

        let records = requester.fetch(&first_batch(4)).await.unwrap();
        assert_eq!(records.len(), 4);
        let stats = requester.stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.retried_requests, 2);
        assert_eq!(
            requester.request_stats().get_error_count(ErrorType::Connect),
            1
        );
        assert_eq!(
            requester.request_stats().get_error_count(ErrorType::Decode),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_network_errors_have_no_status() {
        let transport = Arc::new(FakeTransport::scripted(vec![Err(
            TransportError::Timeout("deadline elapsed".into()),
        )]));
        let requester = requester_with(
            Arc::clone(&transport),
            2,
            Duration::from_millis(10),
            Duration::ZERO,
        );

        let err = requester.fetch(&first_batch(1)).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(ref msg) if msg.contains("deadline elapsed")));
        assert_eq!(transport.call_count(), 2);
        assert_eq!(requester.stats().failed_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_batches_never_reach_transport() {
        let transport = Arc::new(FakeTransport::always_ok());
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::ZERO,
        );

        let empty = Batch::new(0, Vec::new());
        assert_eq!(
            requester.fetch(&empty).await,
            Err(FetchError::Validation(BatchValidationError::Empty))
        );

        let oversized = Batch::new(0, generate_device_ids(11));
        assert_eq!(
            requester.fetch(&oversized).await,
            Err(FetchError::Validation(BatchValidationError::TooLarge {
                size: 11,
                max: 10
            }))
        );

        assert_eq!(transport.call_count(), 0);
        assert_eq!(requester.stats(), RequestStatsSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_respect_rate_limiter() {
        let transport = Arc::new(FakeTransport::always_ok());
        let requester = requester_with(
            Arc::clone(&transport),
            3,
            Duration::from_millis(1000),
            Duration::from_millis(1000),
        );

        for batch in partition(&generate_device_ids(30), 10).unwrap() {
            requester.fetch(&batch).await.unwrap();
        }

        let requests = transport.requests();
        for pair in requests.windows(2) {
            assert!(pair[1].at.duration_since(pair[0].at) >= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let transport: Arc<dyn Transport> = Arc::new(FakeTransport::always_ok());
        let config = Config::default();
        assert!(matches!(
            RetryingRequester::from_config(&config, transport),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_from_config_uses_configured_policy() {
        let transport: Arc<dyn Transport> = Arc::new(FakeTransport::always_ok());
        let config = Config {
            token: TOKEN.to_string(),
            max_retries: 5,
            retry_delay_ms: 250,
            max_batch_size: 8,
            batch_size: 8,
            ..Default::default()
        };
        let requester = RetryingRequester::from_config(&config, transport).unwrap();
        assert_eq!(
            requester.policy(),
            RetryPolicy::new(5, Duration::from_millis(250))
        );
        assert_eq!(requester.max_batch_size(), 8);
    }
}
