//! Schema command

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fleet_server::db::{migrations, Dialect};

use super::{connect, load_config};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DialectArg {
    Mysql,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Print the DDL instead of running it
    #[arg(long)]
    pub print: bool,

    /// Dialect for --print (default: from the configured database URL)
    #[arg(long, value_enum, requires = "print")]
    pub dialect: Option<DialectArg>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "FLEET_DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_migrate(config_path: Option<&Path>, args: MigrateArgs) -> Result<()> {
    if let (true, Some(dialect)) = (args.print, args.dialect) {
        print_statements(dialect.into());
        return Ok(());
    }

    let config = load_config(config_path, args.database_url)?;
    let executor = connect(&config)?;

    if args.print {
        print_statements(executor.dialect());
        return Ok(());
    }

    migrations::run(&executor)
        .await
        .context("Failed to create database schema")?;
    executor.provider().close().await;
    println!("Schema up to date ({} tables)", migrations::TABLES.len());
    Ok(())
}

fn print_statements(dialect: Dialect) {
    for ddl in migrations::statements(dialect) {
        println!("{ddl};\n");
    }
}
