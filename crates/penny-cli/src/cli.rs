//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Penny - A chat assistant that knows where your money goes
#[derive(Parser)]
#[command(name = "penny")]
#[command(about = "Personal finance chat assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "penny.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Load demo clients (Alice, Bob, Carol) with three months of transactions
    Seed {
        /// Delete existing clients first
        #[arg(long)]
        force: bool,
    },

    /// List clients
    Clients {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a client's spending by category
    Summary {
        /// Client ID
        #[arg(short, long)]
        client: i64,

        /// Lookback window in months
        #[arg(short, long, default_value = "3")]
        months: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Ask the assistant a single question
    ///
    /// Requires OPENAI_API_KEY (or OPENAI_HOST for a compatible local server).
    Chat {
        /// Client ID
        #[arg(short, long)]
        client: i64,

        /// Question to ask
        #[arg(short, long)]
        message: String,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an API key from PENNY_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },
}
