//! HTTP server command
//!
//! Creates any missing tables, then serves the REST API until SIGTERM or
//! Ctrl+C.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use fleet_server::db::migrations;

use super::{connect, load_config};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config; default 127.0.0.1:5080)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "FLEET_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Do not create missing tables on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the HTTP server
pub async fn run_serve(config_path: Option<&Path>, args: ServeArgs) -> Result<()> {
    let mut config = load_config(config_path, args.database_url)?;
    if let Some(bind) = args.bind {
        config.http.bind_addr = bind;
    }
    if args.cors_permissive {
        config.http.cors_permissive = true;
    }

    let executor = connect(&config)?;

    if args.skip_migrations {
        tracing::info!("Skipping schema migrations");
    } else {
        migrations::run(&executor)
            .await
            .context("Failed to create database schema")?;
    }

    tracing::info!("Starting fleet server on {}", config.http.bind_addr);

    // Run server (blocks until shutdown)
    fleet_server::run_server(executor, config.http)
        .await
        .context("Server error")?;

    Ok(())
}
