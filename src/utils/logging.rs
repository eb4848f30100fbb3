// Tracing subscriber setup
use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn build_filter(default_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("Invalid log_level in config.json: {}", default_level)),
    }
}

/// Logs go to stderr so the restore summary on stdout stays clean.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = build_filter(default_level)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}
