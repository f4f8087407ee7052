//! HTTP client backed by reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Reqwest-based [`HttpClient`].
///
/// Retries transport failures and retryable statuses according to the
/// supplied [`RetryPolicy`]. Other statuses are returned to the caller.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("tunedeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.get(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn transport_error(e: reqwest::Error) -> BridgeError {
    if e.is_timeout() {
        BridgeError::OperationFailed("Request timed out".to_string())
    } else if e.is_connect() {
        BridgeError::NotAvailable(format!("Connection failed: {}", e))
    } else {
        BridgeError::OperationFailed(e.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.send(&request).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(attempt, max_attempts, url = %request.url, "HTTP GET");

            let outcome = self.send(&request).await;
            let retry = match &outcome {
                Ok(response) => response.is_retryable(),
                Err(_) => true,
            };
            if !retry || attempt >= max_attempts {
                return outcome;
            }

            match &outcome {
                Ok(response) => warn!(status = response.status, attempt, "Retryable HTTP status"),
                Err(e) => warn!(error = %e, attempt, "HTTP request failed"),
            }

            let delay = policy.delay_for(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
            sleep(delay).await;
            attempt += 1;
        }
    }
}
