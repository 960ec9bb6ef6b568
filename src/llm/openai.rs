//! OpenAI-compatible Chat Completions client.
//!
//! Talks to any endpoint that speaks `POST {base_url}/chat/completions`
//! with bearer authentication. The defaults point at DeepSeek.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sift::llm::{CompletionOptions, CompletionProvider, OpenAiCompatClient, OpenAiCompatConfig};
//!
//! # async fn example() -> Result<(), sift::llm::LlmError> {
//! let client = OpenAiCompatClient::new(OpenAiCompatConfig::new("sk-..."))?;
//! let text = client
//!     .complete("You are terse.", "Say hi", &CompletionOptions::new())
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;

use super::error::LlmError;
use super::provider::CompletionProvider;
use super::types::CompletionOptions;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Default model name.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

// ── Configuration ─────────────────────────────────────────────

/// Configuration for [`OpenAiCompatClient`].
#[derive(Clone)]
pub struct OpenAiCompatConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    /// The model to use.
    pub model: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatConfig {
    /// Create a config for the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ── Request / response ────────────────────────────────────────

/// Build the JSON request body for one non-streaming completion.
pub fn build_chat_request(
    model: &str,
    system: &str,
    user: &str,
    options: &CompletionOptions,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": user},
        ],
        "stream": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(temp) = options.temperature {
            obj.insert("temperature".into(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".into(), serde_json::json!(max_tokens));
        }
        if options.json_output {
            obj.insert(
                "response_format".into(),
                serde_json::json!({"type": "json_object"}),
            );
        }
    }

    body
}

/// Pull `choices[0].message.content` out of a response body.
pub fn parse_chat_response(body: &str) -> Result<String, LlmError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| LlmError::ResponseInvalid(format!("response is not JSON: {e}")))?;

    value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(String::from)
        .ok_or_else(|| {
            LlmError::ResponseInvalid("response has no choices[0].message.content".into())
        })
}

/// Extract an error message from an error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Map an HTTP error status to the appropriate [`LlmError`].
fn map_http_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 => LlmError::AuthError(format!("authentication failed: {message}")),
        429 => LlmError::RequestError(format!("rate limited: {message}")),
        code => LlmError::ProviderError(format!("HTTP {code}: {message}")),
    }
}

// ── Client ────────────────────────────────────────────────────

/// Chat Completions client for OpenAI-compatible endpoints.
pub struct OpenAiCompatClient {
    config: OpenAiCompatConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl OpenAiCompatClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] if the API key is blank or the HTTP
    /// client cannot be built.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::ConfigError("API key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatClient {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let body = build_chat_request(&self.config.model, system, user, options);
        tracing::debug!(
            model = %self.config.model,
            temperature = ?options.temperature,
            json = options.json_output,
            "sending completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::TimeoutError(format!(
                        "no response within {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    LlmError::RequestError(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::RequestError(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        parse_chat_response(&text)
    }
}
