pub(crate) mod bulk;
pub(crate) mod counters;
pub(crate) mod decoder;
mod logic;
pub(crate) mod locator;
pub(crate) mod retry;
pub(crate) mod schema;
pub(crate) mod strategy;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::client::{GraphClient, RestClient};
use crate::config::{AppConfig, load_restore_config_from_json};
use crate::utils::setting::check_graph_connection;

pub use logic::RestoreManager;
pub use retry::RetryPolicy;

/// Public entry point for the restore process.
pub async fn run_restore_flow(app_config: &AppConfig) -> Result<()> {
    let restore_config = load_restore_config_from_json(&app_config.raw_json_config)
        .context("Failed to load restore configuration from JSON")?;

    info!(
        graph = %restore_config.connection.graph,
        url = %restore_config.connection.url,
        input_dir = %restore_config.input_dir.display(),
        workers = restore_config.workers,
        "Restore target"
    );

    let client: Arc<dyn GraphClient> = Arc::new(
        RestClient::new(&restore_config.connection).context("Failed to create graph client")?,
    );
    if !check_graph_connection(client.as_ref(), &restore_config.connection.graph).await {
        anyhow::bail!("Cannot proceed with restore - graph connection failed");
    }

    let manager = RestoreManager::new(
        client,
        RetryPolicy::new(&restore_config.retry),
        restore_config.workers,
    );
    manager
        .restore(&restore_config.restore_types, &restore_config.input_dir)
        .await
        .with_context(|| format!("Restore from {} failed", restore_config.input_dir.display()))?;
    Ok(())
}
