//! Mock backend for testing
//!
//! Returns a fixed reply (or a fixed failure) without any network access,
//! and records what it was asked so tests can inspect the conversation that
//! reached the completion boundary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::ChatMessage;

use super::types::CompletionOptions;
use super::ChatBackend;

/// Reply returned by `MockBackend::new()`
pub const DEFAULT_MOCK_REPLY: &str =
    "Try setting a weekly budget for dining out and move the difference into savings.";

/// Mock completion backend for testing
///
/// Clones share the call counter and the recorded request.
#[derive(Clone)]
pub struct MockBackend {
    reply: String,
    /// When set, every completion fails with this upstream error message
    failure: Option<String>,
    /// Whether health_check should return true
    pub healthy: bool,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<(Vec<ChatMessage>, CompletionOptions)>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, default reply)
    pub fn new() -> Self {
        Self::with_reply(DEFAULT_MOCK_REPLY)
    }

    /// Create a mock that always answers with `reply`
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            failure: None,
            healthy: true,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock whose completions always fail like an unreachable API
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            healthy: false,
            ..Self::new()
        }
    }

    /// Number of completion calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages sent with the most recent completion call
    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(messages, _)| messages.clone()))
    }

    /// Options sent with the most recent completion call
    pub fn last_options(&self) -> Option<CompletionOptions> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(_, options)| *options))
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some((messages.to_vec(), *options));
        }

        match self.failure {
            Some(ref message) => Err(Error::Upstream(message.clone())),
            None => Ok(self.reply.clone()),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_requests() {
        let mock = MockBackend::with_reply("ok");
        let shared = mock.clone();

        let options = CompletionOptions {
            temperature: 0.2,
            max_tokens: 10,
        };
        let reply = mock
            .chat_completion(&[ChatMessage::user("first")], &options)
            .await
            .unwrap();

        assert_eq!(reply, "ok");
        assert_eq!(shared.call_count(), 1);
        assert_eq!(shared.last_messages().unwrap()[0].content, "first");
        assert_eq!(shared.last_options().unwrap(), options);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockBackend::failing("rate limited");
        let err = mock
            .chat_completion(&[ChatMessage::user("hi")], &CompletionOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_upstream());
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(mock.call_count(), 1);
        assert!(!mock.health_check().await);
    }

    #[test]
    fn test_fresh_mock_has_no_history() {
        let mock = MockBackend::new();
        assert_eq!(mock.call_count(), 0);
        assert!(mock.last_messages().is_none());
    }
}
