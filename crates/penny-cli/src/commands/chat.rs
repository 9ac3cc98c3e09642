//! Chat command implementation

use anyhow::{Context, Result};
use penny_core::{AIClient, ChatBackend, ChatMessage, ChatOrchestrator, Database};

/// Ask the assistant one question and print the reply
///
/// Returns the reply text.
pub async fn cmd_chat(db: &Database, ai: AIClient, client_id: i64, message: &str) -> Result<String> {
    let client = db.require_client(client_id)?;
    println!("💬 Asking {} about {}'s finances...", ai.model(), client.name);

    let orchestrator = ChatOrchestrator::new(db.clone(), ai);
    let reply = orchestrator
        .chat(client_id, vec![ChatMessage::user(message)])
        .await
        .context("Assistant request failed")?;

    println!();
    println!("{}", reply.content);

    Ok(reply.content)
}
