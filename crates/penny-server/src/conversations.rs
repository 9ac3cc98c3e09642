//! In-memory conversation store
//!
//! Keeps the latest exchange per client so operators can inspect or clear
//! it. The store is written by the chat handler but never read back into a
//! prompt; callers still send the whole history with every request.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use penny_core::ChatMessage;
use serde::Serialize;
use tokio::sync::RwLock;

/// Conversation timeout (30 minutes of inactivity)
pub const CONVERSATION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Maximum messages kept per conversation (most recent win)
pub const MAX_HISTORY_MESSAGES: usize = 50;

#[derive(Debug, Clone)]
struct Conversation {
    created_at: Instant,
    last_activity: Instant,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    fn new() -> Self {
        Self {
            created_at: Instant::now(),
            last_activity: Instant::now(),
            messages: Vec::new(),
        }
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }

    fn replace_messages(&mut self, messages: Vec<ChatMessage>, max_messages: usize) {
        self.messages = messages;
        if self.messages.len() > max_messages {
            let start = self.messages.len() - max_messages;
            self.messages.drain(..start);
        }
        self.last_activity = Instant::now();
    }
}

/// Snapshot of one client's conversation
#[derive(Debug, Serialize)]
pub struct ConversationInfo {
    pub client_id: i64,
    pub message_count: usize,
    pub created_at_secs_ago: u64,
    pub last_activity_secs_ago: u64,
    pub messages: Vec<ChatMessage>,
}

/// Per-client conversation store with inactivity expiry
#[derive(Debug)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<i64, Conversation>>,
    timeout: Duration,
    max_messages: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::with_limits(CONVERSATION_TIMEOUT, MAX_HISTORY_MESSAGES)
    }

    pub fn with_limits(timeout: Duration, max_messages: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            timeout,
            max_messages,
        }
    }

    /// Replace a client's conversation with `messages`
    pub async fn record(&self, client_id: i64, messages: Vec<ChatMessage>) {
        let mut conversations = self.conversations.write().await;

        // Clean up expired conversations while we're here
        let timeout = self.timeout;
        conversations.retain(|_, c| !c.is_expired(timeout));

        conversations
            .entry(client_id)
            .or_insert_with(Conversation::new)
            .replace_messages(messages, self.max_messages);
    }

    /// Get a client's messages (empty if not found or expired)
    pub async fn history(&self, client_id: i64) -> Vec<ChatMessage> {
        let conversations = self.conversations.read().await;
        conversations
            .get(&client_id)
            .filter(|c| !c.is_expired(self.timeout))
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Get a client's conversation with timing info
    pub async fn info(&self, client_id: i64) -> Option<ConversationInfo> {
        let conversations = self.conversations.read().await;
        conversations
            .get(&client_id)
            .filter(|c| !c.is_expired(self.timeout))
            .map(|c| ConversationInfo {
                client_id,
                message_count: c.messages.len(),
                created_at_secs_ago: c.created_at.elapsed().as_secs(),
                last_activity_secs_ago: c.last_activity.elapsed().as_secs(),
                messages: c.messages.clone(),
            })
    }

    /// Forget a client's conversation, returning whether one existed
    pub async fn reset(&self, client_id: i64) -> bool {
        let mut conversations = self.conversations.write().await;
        conversations.remove(&client_id).is_some()
    }

    /// Number of stored conversations, expired ones included until the next write
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<ChatMessage> {
        (0..n).map(|i| ChatMessage::user(format!("msg {}", i))).collect()
    }

    #[tokio::test]
    async fn test_record_and_history() {
        let store = ConversationStore::new();
        assert!(store.history(1).await.is_empty());

        store
            .record(1, vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")])
            .await;
        let history = store.history(1).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "hello");

        // Replaced, not appended
        store.record(1, vec![ChatMessage::user("again")]).await;
        assert_eq!(store.history(1).await.len(), 1);
        assert!(store.history(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_keeps_most_recent_messages() {
        let store = ConversationStore::with_limits(CONVERSATION_TIMEOUT, 3);
        store.record(7, numbered(5)).await;

        let history = store.history(7).await;
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[tokio::test]
    async fn test_expired_conversations_are_hidden_and_purged() {
        let store = ConversationStore::with_limits(Duration::ZERO, MAX_HISTORY_MESSAGES);
        store.record(1, numbered(2)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(store.history(1).await.is_empty());
        assert!(store.info(1).await.is_none());

        // Writing another conversation purges the expired one
        store.record(2, numbered(1)).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_reset() {
        let store = ConversationStore::new();
        store.record(3, numbered(2)).await;

        let info = store.info(3).await.unwrap();
        assert_eq!(info.message_count, 2);
        assert_eq!(info.client_id, 3);

        assert!(store.reset(3).await);
        assert!(!store.reset(3).await);
        assert!(store.history(3).await.is_empty());
    }
}
