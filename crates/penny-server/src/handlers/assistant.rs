//! Assistant handlers - the chat endpoint and conversation history
//!
//! The caller owns the conversation: every chat request carries the full
//! history, and the reply is returned for the caller to append.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AppError, AppState, ConversationInfo};
use penny_core::ChatMessage;

/// Request body for POST /api/assistant/chat
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub client_id: i64,
    /// Conversation so far, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Single user message (appended after `messages`)
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// Normalize both request shapes into one ordered list
    fn into_messages(self) -> Vec<ChatMessage> {
        let mut messages = self.messages;
        if let Some(text) = self.message {
            messages.push(ChatMessage::user(text));
        }
        messages
    }
}

/// Response body for POST /api/assistant/chat
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

/// POST /api/assistant/chat - Ask the assistant for a reply
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let assistant = state.assistant.as_ref().ok_or_else(|| {
        AppError::service_unavailable(
            "Chat requires a completion backend. Set OPENAI_API_KEY (or OPENAI_HOST).",
        )
    })?;

    let client_id = payload.client_id;
    let messages = payload.into_messages();
    if messages.is_empty() {
        return Err(AppError::bad_request(
            "Request must include `messages` or `message`",
        ));
    }

    debug!(client_id, history_len = messages.len(), "Processing chat request");

    let reply = assistant.chat(client_id, messages.clone()).await?;

    info!(client_id, reply_len = reply.content.len(), "Assistant replied");

    let content = reply.content.clone();

    // A caller-supplied system message bypasses the client lookup
    if state.db.get_client(client_id)?.is_some() {
        let mut conversation = messages;
        conversation.push(reply);
        state.conversations.record(client_id, conversation).await;
    } else {
        debug!(client_id, "Unknown client, conversation not recorded");
    }

    Ok(Json(ChatResponse { message: content }))
}

/// GET /api/assistant/history/:client_id - Latest recorded conversation
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
) -> Result<Json<ConversationInfo>, AppError> {
    let info = state
        .conversations
        .info(client_id)
        .await
        .ok_or_else(|| AppError::not_found("Conversation not found or expired"))?;

    Ok(Json(info))
}

/// DELETE /api/assistant/history/:client_id - Forget the recorded conversation
pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.conversations.reset(client_id).await;

    debug!(client_id, deleted, "Cleared conversation");

    Ok(Json(serde_json::json!({ "success": true, "deleted": deleted })))
}
