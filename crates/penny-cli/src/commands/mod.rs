//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, seed) and shared utilities (open_db, require_ai)
//! - `clients` - Client listing and spending summaries
//! - `chat` - One-shot assistant question
//! - `serve` - Web server command

pub mod chat;
pub mod clients;
pub mod core;
pub mod serve;

// Re-export command functions for main.rs
pub use chat::*;
pub use clients::*;
pub use core::*;
pub use serve::*;
