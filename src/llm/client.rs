//! OpenAI-compatible chat completion client
//!
//! Provides a structured HTTP client with:
//! - Bearer token authentication
//! - One-shot and streamed (SSE) completions
//! - Error handling with network vs API error distinction

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use super::stream::{SseDecoder, SseEvent, StreamChunk};

// =============================================================================
// Error Types
// =============================================================================

/// Chat completion API errors
#[derive(Debug, Error)]
pub enum LlmError {
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
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimit { retry_after_secs: u64 },

    /// Invalid API key
    #[error("Invalid API key")]
    Unauthorized,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

// =============================================================================
// API Types
// =============================================================================

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion options
#[derive(Debug, Clone, Default)]
pub struct ChatCompletionOptions {
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

/// Chat completion response
#[derive(Debug, Clone)]
pub struct ChatCompletionResponse {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// Stream of decoded completion chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, LlmError>> + Send>>;

// =============================================================================
// Internal API Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Option<Vec<Choice>>,
    model: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

// =============================================================================
// Chat Client
// =============================================================================

/// Chat completion API client
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl ChatClient {
    /// Default API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Create a new client against the default base URL
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

    /// Build request body for chat completion
    pub fn build_request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
        stream: bool,
    ) -> serde_json::Value {
        let mut body = json!({
            "model": model,
            "messages": messages,
        });

        if stream {
            body["stream"] = json!(true);
        }

        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }

    /// Send a chat completion request and wait for the whole answer
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        options: ChatCompletionOptions,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let body = self.build_request_body(model, &messages, &options, false);
        let response = self.send(&body).await?;

        let response_text = response.text().await?;
        let api_response: ApiResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmError::Parse(format!("{}: {}", e, response_text)))?;

        if let Some(error) = api_response.error {
            return Err(LlmError::Api {
                status: 200,
                message: error.message,
            });
        }

        let choice = api_response
            .choices
            .and_then(|choices| choices.into_iter().next())
            .ok_or_else(|| LlmError::Parse("No choices in response".to_string()))?;

        let content = choice
            .message
            .and_then(|msg| msg.content)
            .ok_or_else(|| LlmError::Parse("No content in response".to_string()))?;

        Ok(ChatCompletionResponse {
            content,
            model: api_response.model.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })
    }

    /// Open a streamed chat completion
    ///
    /// HTTP-level failures are returned immediately; failures while reading
    /// the body surface as `Err` items and end the stream.
    pub async fn stream_chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        options: ChatCompletionOptions,
    ) -> Result<ChunkStream, LlmError> {
        let body = self.build_request_body(model, &messages, &options, true);
        let response = self.send(&body).await?;
        let mut bytes = Box::pin(response.bytes_stream());

        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            let mut done = false;

            while let Some(item) = bytes.next().await {
                let item = match item {
                    Ok(item) => item,
                    Err(e) => {
                        yield Err(LlmError::from(e));
                        return;
                    }
                };
                let events = match decoder.feed(&item) {
                    Ok(events) => events,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                for event in events {
                    match event {
                        SseEvent::Chunk(chunk) => yield Ok(chunk),
                        SseEvent::Done => done = true,
                    }
                }
                if done {
                    break;
                }
            }

            if !done {
                match decoder.finish() {
                    Ok(Some(SseEvent::Chunk(chunk))) => yield Ok(chunk),
                    Ok(_) => {}
                    Err(e) => yield Err(e),
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn send(&self, body: &serde_json::Value) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(LlmError::RateLimit {
                retry_after_secs: retry_after,
            });
        }

        if status.as_u16() == 401 {
            return Err(LlmError::Unauthorized);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Get API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
