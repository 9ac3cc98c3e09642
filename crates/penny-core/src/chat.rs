//! Chat orchestration
//!
//! Ties the store, the spending summary, the prompt builder and the
//! completion backend together:
//!
//! ```text
//! messages ──► has system message? ──no──► load client ─► summarize last N months
//!                    │                                           │
//!                   yes                                 build system prompt
//!                    │                                           │
//!                    ▼                                           ▼
//!              completion API ◄──────────── insert at index 0 ───┘
//!                    │
//!                    ▼
//!        assistant message (timestamped)
//! ```
//!
//! A caller-supplied system message is never refreshed, even if the
//! client's data changed since it was built.

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::ai::{AIClient, ChatBackend, CompletionOptions};
use crate::db::Database;
use crate::error::Result;
use crate::models::{ChatMessage, ChatRole};
use crate::prompts::build_system_prompt;
use crate::spending::DEFAULT_LOOKBACK_MONTHS;

/// Chat orchestrator for one request at a time
#[derive(Clone)]
pub struct ChatOrchestrator {
    db: Database,
    backend: AIClient,
    options: CompletionOptions,
    lookback_months: u32,
}

impl ChatOrchestrator {
    /// Create a new orchestrator with default generation options and a 3-month window
    pub fn new(db: Database, backend: impl Into<AIClient>) -> Self {
        Self {
            db,
            backend: backend.into(),
            options: CompletionOptions::default(),
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
        }
    }

    /// Create from environment (see `AIClient::from_env`)
    pub fn from_env(db: Database) -> Option<Self> {
        AIClient::from_env().map(|backend| Self::new(db, backend))
    }

    /// Use a different lookback window for the system prompt
    pub fn with_lookback_months(mut self, months: u32) -> Self {
        self.lookback_months = months;
        self
    }

    /// Use different generation options
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &AIClient {
        &self.backend
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Build the system message for a client from their spending as of `today`
    ///
    /// Fails with `Error::NotFound` if the client does not exist.
    pub fn system_message_for(&self, client_id: i64, today: NaiveDate) -> Result<ChatMessage> {
        let client = self.db.require_client(client_id)?;
        let summary = self
            .db
            .spending_summary(client_id, self.lookback_months, today)?;

        if summary.is_empty() {
            info!(client_id, "No financial data available for client");
        }

        let prompt = build_system_prompt(&client.name, self.lookback_months, &summary.by_category);
        debug!(client_id, prompt = %prompt, "Built system prompt");

        Ok(ChatMessage::system(prompt).stamped())
    }

    /// Return the conversation with a system message at the front
    ///
    /// If any message already has the system role the list is returned
    /// unchanged and the store is not touched. Otherwise exactly one system
    /// message is inserted at index 0.
    pub fn ensure_system_message(
        &self,
        client_id: i64,
        messages: Vec<ChatMessage>,
    ) -> Result<Vec<ChatMessage>> {
        if messages.iter().any(ChatMessage::is_system) {
            return Ok(messages);
        }

        let today = Local::now().date_naive();
        let system = self.system_message_for(client_id, today)?;

        let mut history = Vec::with_capacity(messages.len() + 1);
        history.push(system);
        history.extend(messages);
        Ok(history)
    }

    /// Send the conversation to the completion backend and wrap the reply
    ///
    /// Backend failures propagate as-is; there is no retry.
    pub async fn chat(&self, client_id: i64, messages: Vec<ChatMessage>) -> Result<ChatMessage> {
        let history = self.ensure_system_message(client_id, messages)?;

        debug!(
            client_id,
            messages = history.len(),
            model = %self.backend.model(),
            "Requesting chat completion"
        );

        let reply = self.backend.chat_completion(&history, &self.options).await?;

        Ok(ChatMessage::new(ChatRole::Assistant, reply).stamped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::error::Error;
    use crate::models::{NewClient, NewTransaction};
    use chrono::{Days, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let client_id = db
            .insert_client(&NewClient::new("Alice", today()).with_email("alice@example.com"))
            .unwrap();
        (db, client_id)
    }

    fn add_tx(db: &Database, client_id: i64, category: &str, amount: &str, days_ago: u64) {
        let date = today().checked_sub_days(Days::new(days_ago)).unwrap();
        db.insert_transaction(
            client_id,
            &NewTransaction::new(category, Decimal::from_str(amount).unwrap(), date),
        )
        .unwrap();
    }

    #[test]
    fn test_injects_single_system_message_at_front() {
        let (db, client_id) = setup();
        add_tx(&db, client_id, "Food", "10.555", 3);
        add_tx(&db, client_id, "Food", "5.00", 10);

        let orchestrator = ChatOrchestrator::new(db, MockBackend::new());
        let input = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("second"),
            ChatMessage::user("third"),
        ];

        let history = orchestrator
            .ensure_system_message(client_id, input.clone())
            .unwrap();

        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, ChatRole::System);
        assert_eq!(history.iter().filter(|m| m.is_system()).count(), 1);
        assert_eq!(&history[1..], &input[..]);
        assert!(history[0].content.contains("Alice"));
        assert!(history[0].content.contains("- Food: $15.56"));
    }

    #[test]
    fn test_existing_system_message_is_kept() {
        let (db, client_id) = setup();
        add_tx(&db, client_id, "Travel", "300", 1);

        let orchestrator = ChatOrchestrator::new(db, MockBackend::new());
        let input = vec![
            ChatMessage::user("hi"),
            ChatMessage::system("stale context"),
        ];

        let history = orchestrator
            .ensure_system_message(client_id, input.clone())
            .unwrap();
        assert_eq!(history, input);
    }

    #[test]
    fn test_existing_system_message_skips_client_lookup() {
        let db = Database::in_memory().unwrap();
        let orchestrator = ChatOrchestrator::new(db, MockBackend::new());

        // Unknown client, but nothing needs to be injected
        let history = orchestrator
            .ensure_system_message(999, vec![ChatMessage::system("ctx")])
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_only_old_transactions_selects_fallback() {
        let (db, client_id) = setup();
        add_tx(&db, client_id, "Food", "42.00", 200);

        let orchestrator = ChatOrchestrator::new(db, MockBackend::new());
        let system = orchestrator.system_message_for(client_id, today()).unwrap();

        assert_eq!(system.content, crate::prompts::fallback_system_prompt());
        assert!(!system.content.contains("Alice"));
    }

    #[test]
    fn test_lookback_window_is_configurable() {
        let (db, client_id) = setup();
        add_tx(&db, client_id, "Rent", "900", 150);

        let orchestrator = ChatOrchestrator::new(db, MockBackend::new()).with_lookback_months(6);
        let system = orchestrator.system_message_for(client_id, today()).unwrap();
        assert!(system.content.contains("- Rent: $900.00"));
        assert!(system.content.contains("last 6 months"));
        assert!(!system.content.contains("last 3 months"));
    }

    #[tokio::test]
    async fn test_overflowing_totals_fail_without_calling_backend() {
        let (db, client_id) = setup();
        let date = today().checked_sub_days(Days::new(1)).unwrap();
        for _ in 0..2 {
            db.insert_transaction(client_id, &NewTransaction::new("Food", Decimal::MAX, date))
                .unwrap();
        }

        let mock = MockBackend::new();
        let orchestrator = ChatOrchestrator::new(db, mock.clone());

        assert!(matches!(
            orchestrator.system_message_for(client_id, today()),
            Err(Error::InvalidData(_))
        ));

        let err = orchestrator
            .chat(client_id, vec![ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_client_fails_without_calling_backend() {
        let db = Database::in_memory().unwrap();
        let mock = MockBackend::new();
        let orchestrator = ChatOrchestrator::new(db, mock.clone());

        let err = orchestrator
            .chat(404, vec![ChatMessage::user("hello")])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("404"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reply_is_timestamped_assistant_message() {
        let (db, client_id) = setup();
        let mock = MockBackend::with_reply("Cook at home twice a week.");
        let orchestrator = ChatOrchestrator::new(db, mock.clone());

        let start = Utc::now();
        let reply = orchestrator
            .chat(client_id, vec![ChatMessage::user("How can I save?")])
            .await
            .unwrap();

        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.content, "Cook at home twice a week.");
        assert!(reply.timestamp.unwrap() >= start);

        assert_eq!(mock.call_count(), 1);
        let sent = mock.last_messages().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, ChatRole::System);
        assert_eq!(sent[1].content, "How can I save?");

        let options = mock.last_options().unwrap();
        assert_eq!(options.max_tokens, 500);
        assert!((options.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let (db, client_id) = setup();
        let mock = MockBackend::failing("connection refused");
        let orchestrator = ChatOrchestrator::new(db, mock.clone());

        let err = orchestrator
            .chat(client_id, vec![ChatMessage::user("hi")])
            .await
            .unwrap_err();

        assert!(err.is_upstream());
        assert_eq!(mock.call_count(), 1);
    }
}
