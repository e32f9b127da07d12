//! Tavily search API client
//!
//! Implements [`SearchTransport`] for the `/search` endpoint and exposes
//! the `/extract` endpoint used to scrape a company website.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::{SearchDepth, SearchScope};

// =============================================================================
// Error Types
// =============================================================================

/// Search transport errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network error (connection failed, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (4xx/5xx responses)
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response parsing error
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Invalid API key
    #[error("Invalid API key")]
    Unauthorized,
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Network(err.to_string())
    }
}

// =============================================================================
// Transport Types
// =============================================================================

/// Parameters of one search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub scope: SearchScope,
    pub max_results: usize,
    pub depth: SearchDepth,
}

/// One raw entry of a search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// A web search backend
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    results: Vec<ExtractedPage>,
}

/// One page returned by `/extract`
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedPage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub raw_content: Option<String>,
}

// =============================================================================
// Tavily Client
// =============================================================================

/// Tavily API client
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl TavilyClient {
    /// Tavily API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.tavily.com";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(api_key, None, None)
    }

    /// Create client with custom configuration
    pub fn with_config(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: timeout.unwrap_or(Duration::from_secs(60)),
        }
    }

    /// Build request body for a search; `topic` is omitted for general scope
    pub fn build_search_body(&self, request: &SearchRequest) -> serde_json::Value {
        let mut body = json!({
            "query": request.query,
            "search_depth": request.depth.as_str(),
            "include_raw_content": false,
            "max_results": request.max_results,
        });

        if request.scope != SearchScope::General {
            body["topic"] = json!(request.scope.as_str());
        }

        body
    }

    /// Extract the raw content of the given pages
    pub async fn extract(
        &self,
        urls: &[String],
        depth: SearchDepth,
    ) -> Result<Vec<ExtractedPage>, SearchError> {
        let body = json!({
            "urls": urls,
            "extract_depth": depth.as_str(),
        });
        let text = self.post("extract", &body).await?;
        let response: ExtractResponse = serde_json::from_str(&text)
            .map_err(|e| SearchError::Parse(format!("{}: {}", e, text)))?;
        Ok(response.results)
    }

    async fn post(&self, endpoint: &str, body: &serde_json::Value) -> Result<String, SearchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 => return Err(SearchError::Unauthorized),
            429 => return Err(SearchError::RateLimit),
            _ => {}
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(text)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SearchTransport for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        let body = self.build_search_body(request);
        let text = self.post("search", &body).await?;
        let response: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| SearchError::Parse(format!("{}: {}", e, text)))?;
        Ok(response.results)
    }
}
