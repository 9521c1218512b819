//! fleet-server: fleet management REST backend
//!
//! Layers, bottom up:
//! - `db` - connection provider, query executor, generic table access and
//!   one repository per entity
//! - `services` - validation and multi-table workflows
//! - `http` - axum routes translating service results into JSON responses
//!
//! # Example
//!
//! ```ignore
//! let config = FleetConfig::load(None)?;
//! let provider = ConnectionProvider::new(config.connection_settings()?)?;
//! let executor = QueryExecutor::new(provider);
//! db::migrations::run(&executor).await?;
//! run_server(executor, config.http).await?;
//! ```

pub mod config;
pub mod db;
pub mod http;
pub mod services;

pub use config::{ConfigurationError, ConnectionSettings, FleetConfig, HttpConfig};
pub use db::{ConnectionProvider, DataAccessError, QueryExecutor};
pub use http::{build_router, run_server, AppState, ServerError};
pub use services::{ServiceError, ServiceResult};
