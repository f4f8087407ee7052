//! Deezer search client
//!
//! Implements the `SearchProvider` trait for the public Deezer API.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, RetryPolicy};
use bridge_traits::search::{CatalogTrack, SearchProvider};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{DeezerError, Result};
use crate::types::SearchResponse;

/// Deezer API base URL
pub const DEEZER_API_BASE: &str = "https://api.deezer.com";

/// Deezer catalog search
///
/// # Example
///
/// ```ignore
/// use provider_deezer::DeezerSearchProvider;
/// use bridge_traits::SearchProvider;
///
/// let provider = DeezerSearchProvider::new(http_client);
/// let tracks = provider.search("daft punk").await?;
/// ```
pub struct DeezerSearchProvider {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    retry_policy: RetryPolicy,
    limit: Option<u32>,
}

impl DeezerSearchProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: DEEZER_API_BASE.to_string(),
            retry_policy: RetryPolicy::default(),
            limit: None,
        }
    }

    /// Point at a different API host (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Cap the number of results per request.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn search_url(&self, query: &str) -> String {
        let mut url = format!("{}/search?q={}", self.base_url, urlencoding::encode(query));
        if let Some(limit) = self.limit {
            url.push_str(&format!("&limit={}", limit));
        }
        url
    }

    /// Run the search and map results.
    ///
    /// Requests carry no timeout of their own; the HTTP client's applies.
    #[instrument(skip(self))]
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<CatalogTrack>> {
        let request = HttpRequest::get(self.search_url(query))
            .header("Accept", "application/json");

        let response = self
            .http_client
            .execute_with_retry(request, self.retry_policy.clone())
            .await?;

        if !response.is_success() {
            warn!(status = response.status, "Deezer search failed");
            return Err(DeezerError::ApiError {
                status_code: response.status,
                message: response.body_text(),
            });
        }

        let body: SearchResponse = serde_json::from_slice(&response.body)
            .map_err(|e| DeezerError::ParseError(e.to_string()))?;

        if let Some(error) = body.error {
            warn!(code = ?error.code, kind = %error.kind, "Deezer returned an error object");
            return Err(DeezerError::ApiError {
                status_code: response.status,
                message: error.message,
            });
        }

        debug!(count = body.data.len(), total = ?body.total, "Deezer search succeeded");
        Ok(body.data.into_iter().map(CatalogTrack::from).collect())
    }
}

#[async_trait]
impl SearchProvider for DeezerSearchProvider {
    fn name(&self) -> &str {
        "deezer"
    }

    async fn search(&self, query: &str) -> bridge_traits::error::Result<Vec<CatalogTrack>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.search_tracks(query).await.map_err(Into::into)
    }
}
