//! Server configuration
//!
//! Layers, lowest to highest priority:
//! 1. Built-in defaults
//! 2. TOML file (`fleet.toml` in the working directory, or an explicit path)
//! 3. Environment variables (after `.env` is loaded by the caller)
//!
//! Environment variables:
//!   FLEET_DATABASE_URL / DATABASE_URL   # connection string (required)
//!   FLEET_BIND_ADDR                     # default 127.0.0.1:5080
//!   FLEET_MAX_CONNECTIONS               # default 10
//!   FLEET_ACQUIRE_TIMEOUT_SECS          # default 30
//!   FLEET_CORS_PERMISSIVE               # default false

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::db::Dialect;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fleet.toml";

/// Fatal startup configuration problem
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no database connection string configured (set FLEET_DATABASE_URL or [database].url)")]
    MissingConnectionString,

    #[error("connection string has no scheme")]
    MissingScheme,

    #[error("unsupported database scheme '{scheme}' (expected mysql or sqlite)")]
    UnsupportedScheme { scheme: String },

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(#[source] sqlx::Error),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: SocketAddr,
    /// Allow any origin. Localhost only when false.
    pub cors_permissive: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5080)),
            cors_permissive: false,
        }
    }
}

impl FleetConfig {
    /// Load from an explicit file, or `fleet.toml` if present, then apply
    /// process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigurationError::Parse {
            path: path.to_owned(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigurationError> {
        if let Some(url) = lookup("FLEET_DATABASE_URL").or_else(|| lookup("DATABASE_URL")) {
            self.database.url = Some(url);
        }
        if let Some(value) = lookup("FLEET_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("FLEET_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("FLEET_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                parse_value("FLEET_ACQUIRE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("FLEET_BIND_ADDR") {
            self.http.bind_addr = parse_value("FLEET_BIND_ADDR", &value)?;
        }
        if let Some(value) = lookup("FLEET_CORS_PERMISSIVE") {
            self.http.cors_permissive = parse_value("FLEET_CORS_PERMISSIVE", &value)?;
        }
        Ok(())
    }

    /// Resolve connection settings; fails if no connection string is set.
    pub fn connection_settings(&self) -> Result<ConnectionSettings, ConfigurationError> {
        ConnectionSettings::from_config(&self.database)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidValue {
            key,
            value: value.to_owned(),
        })
}

/// Immutable connection settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: String,
    pub dialect: Dialect,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Close idle connections after this long. `None` keeps them forever,
    /// which an in-memory SQLite database needs to survive.
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl ConnectionSettings {
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, ConfigurationError> {
        let url = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigurationError::MissingConnectionString)?;

        if config.max_connections == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "max_connections",
                value: "0".into(),
            });
        }

        Ok(Self {
            url: url.to_owned(),
            dialect: Dialect::from_url(url)?,
            max_connections: config.max_connections,
            acquire_timeout: Duration::from_secs(config.acquire_timeout_secs.max(1)),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        })
    }

    /// Settings for a private in-memory SQLite database.
    ///
    /// A single connection that is never recycled, so every caller sees the
    /// same database.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            dialect: Dialect::Sqlite,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            max_lifetime: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = FleetConfig::default();
        assert_eq!(config.http.bind_addr.port(), 5080);
        assert!(!config.http.cors_permissive);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn missing_connection_string_is_fatal() {
        let config = FleetConfig::default();
        assert!(matches!(
            config.connection_settings(),
            Err(ConfigurationError::MissingConnectionString)
        ));

        let mut blank = FleetConfig::default();
        blank.database.url = Some("   ".into());
        assert!(matches!(
            blank.connection_settings(),
            Err(ConfigurationError::MissingConnectionString)
        ));
    }

    #[test]
    fn env_overrides() {
        let mut config = FleetConfig::default();
        config
            .apply_env(env(&[
                ("DATABASE_URL", "mysql://fleet@db/fleet"),
                ("FLEET_MAX_CONNECTIONS", "4"),
                ("FLEET_BIND_ADDR", "0.0.0.0:8080"),
                ("FLEET_CORS_PERMISSIVE", "true"),
            ]))
            .unwrap();

        let settings = config.connection_settings().unwrap();
        assert_eq!(settings.dialect, Dialect::MySql);
        assert_eq!(settings.max_connections, 4);
        assert_eq!(config.http.bind_addr.port(), 8080);
        assert!(config.http.cors_permissive);
    }

    #[test]
    fn fleet_prefixed_url_wins() {
        let mut config = FleetConfig::default();
        config
            .apply_env(env(&[
                ("DATABASE_URL", "mysql://other/db"),
                ("FLEET_DATABASE_URL", "sqlite://fleet.db"),
            ]))
            .unwrap();
        assert_eq!(config.database.url.as_deref(), Some("sqlite://fleet.db"));
    }

    #[test]
    fn bad_env_value() {
        let mut config = FleetConfig::default();
        let err = config
            .apply_env(env(&[("FLEET_MAX_CONNECTIONS", "many")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidValue {
                key: "FLEET_MAX_CONNECTIONS",
                ..
            }
        ));
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[database]
url = "sqlite://fleet.db"
max_connections = 2

[http]
bind_addr = "127.0.0.1:9000"
"#
        )
        .unwrap();

        let config = FleetConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.acquire_timeout_secs, 30);
        assert_eq!(config.http.bind_addr.port(), 9000);
    }

    #[test]
    fn zero_pool_size_rejected() {
        let mut config = FleetConfig::default();
        config.database.url = Some("sqlite::memory:".into());
        config.database.max_connections = 0;
        assert!(matches!(
            config.connection_settings(),
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }
}
