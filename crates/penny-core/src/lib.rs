//! Penny Core Library
//!
//! Shared functionality for the Penny personal finance assistant:
//! - Database access and migrations for clients and their transactions
//! - Spending aggregation over a lookback window
//! - System prompt construction from spending summaries
//! - Pluggable chat completion backends (OpenAI-compatible, mock)
//! - Chat orchestration that ties the above together
//! - Sample data seeding for development

pub mod ai;
pub mod chat;
pub mod db;
pub mod error;
pub mod models;
pub mod prompts;
pub mod seed;
pub mod spending;

/// Test utilities including a mock completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIClient, ChatBackend, CompletionOptions, MockBackend, OpenAICompatibleBackend};
pub use chat::ChatOrchestrator;
pub use db::Database;
pub use error::{Error, Result};
pub use models::{ChatMessage, ChatRole, Client, NewClient, NewTransaction, Transaction};
pub use spending::SpendingSummary;
