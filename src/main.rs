//! Graph Restore Tool
//!
//! Replays a dumped graph (schema, vertices, edges) into a graph server

// graphrestore/src/main.rs
mod client;
mod config;
mod errors;
mod model;
mod restore;
mod utils;

use anyhow::{Context, Result};
use config::AppConfig;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Main entry point for the restore tool
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(_) => {
            println!("✅ Restore completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = resolve_config_path(env::args().nth(1), env::var("RESTORE_CONFIG").ok());
    let app_config = AppConfig::load_from_json(&config_path).context(format!(
        "Failed to load application configuration from {}",
        config_path.display()
    ))?;

    utils::logging::init_logging(&app_config.log_level)?;

    println!("🔄 Starting Restore Process...");
    restore::run_restore_flow(&app_config)
        .await
        .context("Restore process failed")
}

/// The first CLI argument wins, then `RESTORE_CONFIG`, then `config.json`.
fn resolve_config_path(arg: Option<String>, env_value: Option<String>) -> PathBuf {
    arg.or(env_value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
