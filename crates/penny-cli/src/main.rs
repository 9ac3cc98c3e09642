//! Penny CLI - Personal finance chat assistant
//!
//! Usage:
//!   penny init                           Initialize database
//!   penny seed                           Load demo clients and transactions
//!   penny summary --client 1             Show recent spending
//!   penny chat --client 1 --message ...  Ask the assistant
//!   penny serve --port 3000              Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Seed { force } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_seed(&db, force).map(|_| ())
        }
        Commands::Clients { json } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_clients(&db, json)
        }
        Commands::Summary {
            client,
            months,
            json,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_summary(&db, client, months, json)
        }
        Commands::Chat { client, message } => {
            let db = commands::open_db(&cli.db)?;
            let ai = commands::require_ai()?;
            commands::cmd_chat(&db, ai, client, &message)
                .await
                .map(|_| ())
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth).await,
    }
}
