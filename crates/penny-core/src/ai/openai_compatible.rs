//! OpenAI-compatible backend implementation
//!
//! Works with the hosted OpenAI API and with any server that implements its
//! chat completions endpoint (vLLM, LocalAI, llama-server, ...).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_API_KEY`: API key (sent as a bearer token when set)
//! - `OPENAI_HOST`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4)
//! - `OPENAI_TIMEOUT_SECS`: Request timeout in seconds (default: 30)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::ChatMessage;

use super::types::CompletionOptions;
use super::ChatBackend;

pub const DEFAULT_HOST: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenAI-compatible backend
///
/// Talks to `{host}/v1/chat/completions`.
///
/// # Example
///
/// ```rust,ignore
/// // Hosted OpenAI
/// export OPENAI_API_KEY="sk-..."
/// export OPENAI_MODEL="gpt-4"
///
/// // Local vLLM
/// export OPENAI_HOST="http://192.168.1.100:8000"
/// export OPENAI_MODEL="meta-llama/Llama-3.2-3B-Instruct"
/// ```
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAICompatibleBackend {
    /// Create a new backend with the default timeout
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::with_timeout(base_url, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new backend whose requests give up after `timeout`
    ///
    /// Falls back to an HTTP client without a timeout (and logs a warning)
    /// if the configured client cannot be built.
    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Self {
        Self::try_with_timeout(base_url, model, timeout).unwrap_or_else(|e| {
            warn!(error = %e, ?timeout, "Failed to build HTTP client, requests will not time out");
            Self::from_parts(Client::new(), base_url, model, timeout)
        })
    }

    /// Create a new backend whose requests give up after `timeout`, failing if
    /// the HTTP client cannot be built
    pub fn try_with_timeout(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self::from_parts(http_client, base_url, model, timeout))
    }

    fn from_parts(http_client: Client, base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            timeout,
        }
    }

    /// Attach an API key (sent as `Authorization: Bearer <key>`)
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Create from environment variables
    ///
    /// Requires `OPENAI_API_KEY` or `OPENAI_HOST`; everything else has defaults.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let host = std::env::var("OPENAI_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty());

        if api_key.is_none() && host.is_none() {
            return None;
        }

        let host = host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut backend = Self::with_timeout(&host, &model, Duration::from_secs(timeout_secs));
        backend.api_key = api_key;
        Some(backend)
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => req.header("Authorization", format!("Bearer {}", key)),
            None => req,
        }
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Chat message as the API expects it
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatBackend for OpenAICompatibleBackend {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .authorize(
                self.http_client
                    .post(format!("{}/v1/chat/completions", self.base_url))
                    .json(&request),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("OpenAI API error {}: {}", status, body)));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Upstream("No choices in completion response".into()))
    }

    async fn health_check(&self) -> bool {
        let req = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .timeout(Duration::from_secs(5));
        match self.authorize(req).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
