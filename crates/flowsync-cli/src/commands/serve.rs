//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use flowsync_core::Config;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    config: Config,
) -> Result<()> {
    println!("🚀 Starting FlowSync web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    println!("   Insight source: {}", config.data_source);

    // Parse API keys from environment (comma-separated)
    let api_keys =
        flowsync_server::parse_api_keys(&std::env::var("FLOWSYNC_API_KEYS").unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!(
            "   🔒 Authentication: identity header ({})",
            flowsync_server::IDENTITY_USER_HEADER
        );
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (FLOWSYNC_API_KEYS)",
                api_keys.len()
            );
        }
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let server_config = flowsync_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
        app: config,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    flowsync_server::serve_with_config(db, host, port, static_dir_str, server_config).await?;

    Ok(())
}
