//! Export RW S3 publisher
//!
//! Uploads finished CSV files to the S3 writer service over HTTP.

use crate::adapters::traits::{ArtifactPublisher, HealthCheck};
use crate::config::{RetryConfig, S3WriterConfig};
use crate::domain::{ExporterError, PublishError, Result, TransactionId};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

const S3_WRITER_PATH: &str = "/concept/";
const USER_AGENT: &str = "UPP Concept Exporter";

/// HTTP client for the S3 writer
pub struct S3WriterClient {
    client: Client,
    base_url: String,
    health_url: String,
    retry: RetryConfig,
}

impl S3WriterClient {
    /// Creates a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &S3WriterConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                PublishError::InvalidRequest(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_url: config.health_url(),
            retry: config.retry.clone(),
        })
    }

    fn upload_url(&self, file_name: &str) -> String {
        format!("{}{S3_WRITER_PATH}{file_name}", self.base_url)
    }

    async fn put_once(
        &self,
        url: &str,
        bytes: &[u8],
        tid: &TransactionId,
    ) -> std::result::Result<(), PublishError> {
        let resp = self
            .client
            .put(url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .header("X-Request-Id", tid.as_str())
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| PublishError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PublishError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Retry a request with exponential backoff
    ///
    /// Only transient failures are retried.
    async fn retry_request<F, Fut>(&self, operation: F) -> std::result::Result<(), PublishError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<(), PublishError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(()) => return Ok(()),
                Err(e) if !e.is_transient() || attempt >= self.retry.max_retries => return Err(e),
                Err(e) => {
                    attempt += 1;
                    let delay_ms = backoff_delay_ms(&self.retry, attempt);
                    crate::log_retry_attempt!(attempt, self.retry.max_retries, e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

/// Delay before the given retry attempt (1-based), capped at `max_delay_ms`
fn backoff_delay_ms(retry: &RetryConfig, attempt: usize) -> u64 {
    let exponent = attempt.saturating_sub(1) as i32;
    let delay = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    (delay as u64).min(retry.max_delay_ms)
}

#[async_trait]
impl ArtifactPublisher for S3WriterClient {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str, tid: &TransactionId) -> Result<()> {
        let url = self.upload_url(file_name);
        tracing::debug!(
            transaction_id = %tid,
            file_name,
            size = bytes.len(),
            "Uploading file to Export RW S3"
        );

        self.retry_request(|| self.put_once(&url, &bytes, tid))
            .await
            .map_err(ExporterError::from)
    }
}

#[async_trait]
impl HealthCheck for S3WriterClient {
    fn name(&self) -> &str {
        "Export RW S3"
    }

    async fn check_health(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| {
                PublishError::ConnectionFailed(format!(
                    "Error in getting request to check if S3 Writer is good to go: {e}"
                ))
            })?;

        if resp.status() != StatusCode::OK {
            return Err(PublishError::ConnectionFailed(format!(
                "S3 Writer is not good to go. GTG HTTP status code is {}",
                resp.status().as_u16()
            ))
            .into());
        }
        Ok("S3 Writer is good to go.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, max_retries: usize) -> S3WriterConfig {
        S3WriterConfig {
            base_url: base_url.to_string(),
            retry: RetryConfig {
                max_retries,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
            },
            ..Default::default()
        }
    }

    fn tid() -> TransactionId {
        TransactionId::new("tid_test").unwrap()
    }

    #[tokio::test]
    async fn test_upload_sends_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/concept/Brand.csv")
            .match_header("user-agent", "UPP Concept Exporter")
            .match_header("content-type", "application/json")
            .match_header("x-request-id", "tid_test")
            .match_body("id,prefLabel,apiUrl\n")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = S3WriterClient::new(&config(&server.url(), 0)).unwrap();
        client
            .upload(b"id,prefLabel,apiUrl\n".to_vec(), "Brand.csv", &tid())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/concept/Brand.csv")
            .with_status(400)
            .expect(1)
            .create_async()
            .await;

        let client = S3WriterClient::new(&config(&server.url(), 3)).unwrap();
        let err = client
            .upload(Vec::new(), "Brand.csv", &tid())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Export RW S3 returned HTTP 400");
    }

    #[tokio::test]
    async fn test_upload_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/concept/Person.csv")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = S3WriterClient::new(&config(&server.url(), 2)).unwrap();
        let err = client
            .upload(Vec::new(), "Person.csv", &tid())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExporterError::Publish(PublishError::UnexpectedStatus { status: 503 })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/__gtg")
            .with_status(200)
            .create_async()
            .await;

        let client = S3WriterClient::new(&config(&server.url(), 0)).unwrap();
        assert_eq!(client.check_health().await.unwrap(), "S3 Writer is good to go.");
    }

    #[tokio::test]
    async fn test_health_check_not_good_to_go() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/__gtg")
            .with_status(503)
            .create_async()
            .await;

        let client = S3WriterClient::new(&config(&server.url(), 0)).unwrap();
        let err = client.check_health().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_backoff_delay() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: 300,
            backoff_multiplier: 2.0,
        };
        assert_eq!(backoff_delay_ms(&retry, 1), 100);
        assert_eq!(backoff_delay_ms(&retry, 2), 200);
        assert_eq!(backoff_delay_ms(&retry, 3), 300);
    }
}
