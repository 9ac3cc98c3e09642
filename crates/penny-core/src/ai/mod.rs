//! Pluggable chat completion backend abstraction
//!
//! The assistant delegates reply generation to an external chat completion
//! service. This module hides which service is used behind one interface.
//!
//! # Architecture
//!
//! - `ChatBackend` trait: defines the interface for all completion backends
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env().expect("completion backend not configured");
//! let reply = ai
//!     .chat_completion(&[ChatMessage::user("Hi")], &CompletionOptions::default())
//!     .await?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, mock). Default: openai
//! - `OPENAI_API_KEY`: API key (required unless `OPENAI_HOST` points at a keyless server)
//! - `OPENAI_HOST`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4)
//! - `OPENAI_TIMEOUT_SECS`: Request timeout in seconds (default: 30)

mod mock;
mod openai_compatible;
pub mod types;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::CompletionOptions;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ChatMessage;

/// Trait defining the interface for all completion backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send an ordered, role-tagged conversation and return the first reply's text
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI or any server speaking its chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai` (default): Uses OPENAI_API_KEY, OPENAI_HOST, OPENAI_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement ChatBackend for AIClient by delegating to the inner backend
#[async_trait]
impl ChatBackend for AIClient {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.chat_completion(messages, options).await,
            AIClient::Mock(b) => b.chat_completion(messages, options).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

impl From<MockBackend> for AIClient {
    fn from(backend: MockBackend) -> Self {
        AIClient::Mock(backend)
    }
}

impl From<OpenAICompatibleBackend> for AIClient {
    fn from(backend: OpenAICompatibleBackend) -> Self {
        AIClient::OpenAICompatible(backend)
    }
}
