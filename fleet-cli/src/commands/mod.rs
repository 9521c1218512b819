//! Subcommand implementations

pub mod check;
pub mod migrate;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use fleet_server::{ConnectionProvider, FleetConfig, QueryExecutor};

pub use check::run_check_config;
pub use migrate::run_migrate;
pub use serve::run_serve;

/// Load configuration (file, then environment) and apply a command-line
/// database URL on top.
fn load_config(path: Option<&Path>, database_url: Option<String>) -> Result<FleetConfig> {
    let mut config = FleetConfig::load(path).context("Failed to load configuration")?;
    if let Some(url) = database_url {
        config.database.url = Some(url);
    }
    Ok(config)
}

/// Build the executor. The pool is lazy, so nothing connects yet.
fn connect(config: &FleetConfig) -> Result<QueryExecutor> {
    let settings = config
        .connection_settings()
        .context("Invalid database configuration")?;
    let provider = ConnectionProvider::new(settings).context("Failed to create connection pool")?;
    Ok(QueryExecutor::new(provider))
}
