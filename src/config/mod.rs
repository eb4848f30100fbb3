// graphrestore/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::model::{RestoreType, parse_restore_types};

pub const DEFAULT_GRAPH_NAME: &str = "hugegraph";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Structs for deserializing config.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonRetryOptions {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    pub graph_url: Option<String>,
    pub graph_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub input_dir: Option<PathBuf>,
    pub restore_types: Option<Vec<String>>,
    pub workers: Option<usize>,
    pub retry: Option<JsonRetryOptions>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

// Application's internal configuration structs
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConnection {
    pub url: Url,
    pub graph: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestoreConfig {
    pub connection: GraphConnection,
    pub input_dir: PathBuf,
    pub restore_types: Vec<RestoreType>,
    pub workers: usize,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub raw_json_config: RawJsonConfig,
}

impl AppConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        Self::from_json_str(&config_content).with_context(|| {
            format!(
                "Failed to parse JSON from config file at {}",
                config_path.display()
            )
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw_json_config: RawJsonConfig = serde_json::from_str(content)?;
        let log_level = raw_json_config
            .log_level
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(AppConfig {
            log_level,
            raw_json_config,
        })
    }
}

pub fn load_restore_config_from_json(raw_config: &RawJsonConfig) -> Result<RestoreConfig> {
    let graph_url = raw_config
        .graph_url
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .context("graph_url must be set in config.json for restore")?;
    let url = Url::parse(graph_url)
        .with_context(|| format!("Invalid graph_url in config.json: {}", graph_url))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("graph_url must use http or https, got: {}", url.scheme());
    }

    let input_dir = raw_config
        .input_dir
        .as_ref()
        .context("input_dir must be set in config.json for restore")?
        .clone();
    if input_dir.to_string_lossy().trim().is_empty() {
        anyhow::bail!("input_dir cannot be empty in config.json.");
    }

    let type_names = raw_config
        .restore_types
        .clone()
        .unwrap_or_else(|| vec!["all".to_string()]);
    let restore_types =
        parse_restore_types(&type_names).context("Failed to parse restore_types in config.json")?;

    let workers = match raw_config.workers {
        Some(0) => anyhow::bail!("workers must be at least 1 in config.json."),
        Some(n) => n,
        None => std::thread::available_parallelism().map_or(1, |n| n.get()),
    };

    let retry_opts = raw_config.retry.clone().unwrap_or_default();
    let max_attempts = retry_opts.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
    if max_attempts == 0 {
        anyhow::bail!("retry.max_attempts must be at least 1 in config.json.");
    }

    // A password in the environment (or .env) takes precedence over the file.
    let password = env::var("GRAPH_PASSWORD")
        .ok()
        .or_else(|| raw_config.password.clone());

    Ok(RestoreConfig {
        connection: GraphConnection {
            url,
            graph: raw_config
                .graph_name
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GRAPH_NAME.to_string()),
            username: raw_config.username.clone().filter(|s| !s.is_empty()),
            password,
            timeout: Duration::from_secs(raw_config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        },
        input_dir,
        restore_types,
        workers,
        retry: RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(
                retry_opts.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS),
            ),
        },
    })
}
