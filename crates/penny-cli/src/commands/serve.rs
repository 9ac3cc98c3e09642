//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, no_auth: bool) -> Result<()> {
    println!("🚀 Starting Penny web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys = penny_server::ServerConfig::api_keys_from_env();

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   🔒 Authentication: required, but no keys configured (set PENNY_API_KEYS)");
    } else {
        println!(
            "   🔑 API keys: {} configured (PENNY_API_KEYS)",
            api_keys.len()
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let config = penny_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    penny_server::serve_with_config(db, host, port, config).await?;

    Ok(())
}
