//! OpenAI-compatible HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::chat::{ChatRequest, ChatResponse};
use crate::config::GlanceConfig;
use crate::error::{Error, LlmError, Result};
use crate::transport::ChatTransport;

const PROVIDER: &str = "openai";

/// OpenAI error envelope.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

/// OpenAI error details.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIError {
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAI {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAI {
    /// Create a client for `base_url` authenticating with `api_key`.
    ///
    /// `timeout_secs` overrides the HTTP library's default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be
    /// built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::auth(PROVIDER, "API key is required").into());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Create a client from a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no API key is configured.
    pub fn from_config(config: &GlanceConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::config("API key is not set (OPENAI_API_KEY)"))?;
        Self::new(api_key, &config.base_url, config.timeout_secs)
    }

    /// Build the chat completions URL.
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Parse an error response.
    ///
    /// The status decides auth and rate-limit errors even when the body is
    /// not an OpenAI error envelope.
    fn parse_error(status: u16, body: &str) -> LlmError {
        let envelope = serde_json::from_str::<OpenAIErrorResponse>(body)
            .ok()
            .map(|response| response.error);

        match (status, envelope) {
            (401 | 403, Some(error)) => LlmError::auth(PROVIDER, error.message),
            (401 | 403, None) => LlmError::auth(PROVIDER, format!("HTTP {status}: {body}")),
            (429, _) => LlmError::rate_limited(PROVIDER),
            (_, Some(error)) => {
                let code = match error.code {
                    Some(serde_json::Value::String(code)) => code,
                    Some(code) if !code.is_null() => code.to_string(),
                    _ => error.error_type.unwrap_or_else(|| status.to_string()),
                };
                LlmError::provider_code(PROVIDER, code, error.message)
            }
            (_, None) => LlmError::http_status(status, body.to_owned()),
        }
    }
}

#[async_trait]
impl ChatTransport for OpenAI {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url();
        debug!(url = %url, model = %request.model, "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response.text().await.map_err(LlmError::from)?;
        debug!(status = status.as_u16(), bytes = response_text.len(), "received response");

        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid chat completion response",
                format!("parse error: {e}, response: {response_text}"),
            )
        })?;
        Ok(parsed)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
