//! fleetctl - run and administer the fleet management server
//!
//! - `serve`: create missing tables, then run the HTTP API
//! - `migrate`: create missing tables, or print the schema DDL
//! - `check-config`: show the resolved configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "fleetctl",
    author,
    version,
    about = "Fleet and transport management server",
    long_about = "Vehicles, drivers, missions, maintenance, patrols and inventory over a \
                  JSON REST API backed by MySQL (or SQLite for local use)."
)]
struct Cli {
    /// Configuration file (default: ./fleet.toml when present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create missing tables (or print their DDL)
    Migrate(commands::migrate::MigrateArgs),
    /// Print the resolved configuration and exit
    CheckConfig(commands::check::CheckConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables take precedence
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(config_path, args).await?,
        Commands::Migrate(args) => commands::run_migrate(config_path, args).await?,
        Commands::CheckConfig(args) => commands::run_check_config(config_path, args)?,
    }
    Ok(())
}
