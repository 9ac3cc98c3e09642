//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `require_ai` - Completion backend from the environment, or a helpful error
//! - `cmd_init` - Initialize the database
//! - `cmd_seed` - Load demo data

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use penny_core::seed::{seed_sample_data, SeedReport};
use penny_core::{AIClient, Database};

/// Open (or create) the database and run migrations
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Completion backend from the environment
pub fn require_ai() -> Result<AIClient> {
    AIClient::from_env().context(
        "No completion backend configured. Set OPENAI_API_KEY (or OPENAI_HOST for a local server), or AI_BACKEND=mock.",
    )
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let clients = db.count_clients()?;
    println!("   Clients: {}", clients);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Load demo data: penny seed");
    println!("  2. Ask a question: penny chat --client 1 --message \"How can I save?\"");
    println!("  3. Start the API: penny serve");

    Ok(())
}

/// Seed demo data, optionally wiping existing clients first
///
/// Returns what was inserted, or None if clients already existed.
pub fn cmd_seed(db: &Database, force: bool) -> Result<Option<SeedReport>> {
    if force {
        let existing = db.list_clients()?;
        for client in &existing {
            db.delete_client(client.id)
                .with_context(|| format!("Failed to delete client {}", client.id))?;
        }
        if !existing.is_empty() {
            println!("🗑️  Removed {} existing client(s)", existing.len());
        }
    }

    let mut rng = rand::thread_rng();
    let report = seed_sample_data(db, Local::now().date_naive(), &mut rng)
        .context("Failed to seed sample data")?;

    match report {
        Some(report) => {
            println!(
                "🌱 Seeded {} clients with {} transactions",
                report.clients, report.transactions
            );
        }
        None => {
            println!("ℹ️  Clients already exist, nothing seeded (use --force to replace them)");
        }
    }

    Ok(report)
}
