//! Integration tests for penny-core
//!
//! These tests exercise the full seed → summarize → chat workflow.

use chrono::{Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::str::FromStr;

use penny_core::{
    db::Database,
    models::{ChatMessage, ChatRole, NewClient, NewTransaction},
    prompts::{build_system_prompt, fallback_system_prompt},
    seed::seed_sample_data,
    spending::format_amount,
    ChatOrchestrator, Error, MockBackend,
};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// =============================================================================
// Seed → Summary
// =============================================================================

#[test]
fn test_seeded_clients_have_recent_spending() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let mut rng = StdRng::seed_from_u64(2024);

    let report = seed_sample_data(&db, today(), &mut rng)
        .expect("Seeding failed")
        .expect("Empty database should be seeded");
    assert_eq!(report.clients, 3);

    for client in db.list_clients().unwrap() {
        let summary = db.spending_summary(client.id, 3, today()).unwrap();
        let all = db.list_client_transactions(client.id).unwrap();

        // Everything seeded falls inside the default window
        assert_eq!(summary.transaction_count, all.len());

        let by_category_total: Decimal = summary.by_category.values().copied().sum();
        assert_eq!(by_category_total, summary.total);
    }

    // Second run is a no-op
    let again = seed_sample_data(&db, today(), &mut rng).unwrap();
    assert!(again.is_none());
    assert_eq!(db.count_clients().unwrap(), 3);
}

#[test]
fn test_seeded_prompt_lists_categories_in_order() {
    let db = Database::in_memory().unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    seed_sample_data(&db, today(), &mut rng).unwrap();

    let alice = db
        .list_clients()
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Alice")
        .unwrap();
    let summary = db.spending_summary(alice.id, 3, today()).unwrap();
    let prompt = build_system_prompt(&alice.name, 3, &summary.by_category);

    assert!(prompt.contains("Alice"));
    let lines: Vec<&str> = prompt.lines().filter(|l| l.starts_with("- ")).collect();
    assert_eq!(lines.len(), summary.by_category.len());

    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);

    for (category, amount) in &summary.by_category {
        let expected = format!("- {}: ${}", category, format_amount(*amount));
        assert!(lines.contains(&expected.as_str()), "missing line {}", expected);
    }
}

// =============================================================================
// Chat Workflow
// =============================================================================

#[tokio::test]
async fn test_chat_workflow_with_mock_backend() {
    let db = Database::in_memory().unwrap();
    let client_id = db
        .insert_client(&NewClient::new("Dana", today()))
        .unwrap();
    let recent = today().checked_sub_days(Days::new(5)).unwrap();
    db.insert_transactions(
        client_id,
        &[
            NewTransaction::new("Food", dec("10.555"), recent),
            NewTransaction::new("Food", dec("5.00"), recent),
            NewTransaction::new("Travel", dec("0.125"), recent),
        ],
    )
    .unwrap();

    let mock = MockBackend::with_reply("Plan meals for the week.");
    let orchestrator = ChatOrchestrator::new(db, mock.clone());

    let conversation = vec![
        ChatMessage::user("Hi!"),
        ChatMessage::assistant("Hello, how can I help?"),
        ChatMessage::user("Where does my money go?"),
    ];
    let reply = orchestrator
        .chat(client_id, conversation.clone())
        .await
        .unwrap();

    assert_eq!(reply.role, ChatRole::Assistant);
    assert_eq!(reply.content, "Plan meals for the week.");

    let sent = mock.last_messages().unwrap();
    assert_eq!(sent.len(), conversation.len() + 1);
    assert_eq!(sent[0].role, ChatRole::System);
    assert!(sent[0].content.contains("Dana"));
    assert!(sent[0].content.contains("- Food: $15.56"));
    assert!(sent[0].content.contains("- Travel: $0.13"));
    assert_eq!(&sent[1..], &conversation[..]);
}

#[tokio::test]
async fn test_chat_without_recent_data_uses_fallback() {
    let db = Database::in_memory().unwrap();
    let client_id = db
        .insert_client(&NewClient::new("Eve", today()))
        .unwrap();
    let long_ago = today().checked_sub_days(Days::new(400)).unwrap();
    db.insert_transaction(
        client_id,
        &NewTransaction::new("Food", dec("12.00"), long_ago),
    )
    .unwrap();

    let mock = MockBackend::new();
    let orchestrator = ChatOrchestrator::new(db, mock.clone());
    orchestrator
        .chat(client_id, vec![ChatMessage::user("Any advice?")])
        .await
        .unwrap();

    let sent = mock.last_messages().unwrap();
    assert_eq!(sent[0].content, fallback_system_prompt());
}

#[tokio::test]
async fn test_chat_unknown_client_never_reaches_backend() {
    let db = Database::in_memory().unwrap();
    let mock = MockBackend::new();
    let orchestrator = ChatOrchestrator::new(db, mock.clone());

    let result = orchestrator
        .chat(12345, vec![ChatMessage::user("Hello")])
        .await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_deleted_client_cannot_chat() {
    let db = Database::in_memory().unwrap();
    let client_id = db
        .insert_client(&NewClient::new("Frank", today()))
        .unwrap();
    db.insert_transaction(
        client_id,
        &NewTransaction::new("Food", dec("3.00"), today()),
    )
    .unwrap();
    db.delete_client(client_id).unwrap();

    let orchestrator = ChatOrchestrator::new(db.clone(), MockBackend::new());
    let result = orchestrator
        .chat(client_id, vec![ChatMessage::user("Hello")])
        .await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(db.count_transactions(None).unwrap(), 0);
}
