//! Connection provider
//!
//! Owns the connection settings and the driver's pool. The pool is created
//! lazily, so constructing a provider opens nothing; connections are opened
//! on first `acquire` and returned to the driver pool when dropped.
//! Pooling itself is entirely the driver's.

use std::sync::Arc;

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyPool, Transaction};

use super::Dialect;
use crate::config::{ConfigurationError, ConnectionSettings};

/// Hands out exclusive, short-lived connections.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    pool: AnyPool,
    settings: Arc<ConnectionSettings>,
}

impl ConnectionProvider {
    /// Build a provider from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConnectionString` if the driver
    /// rejects the URL. No connection is attempted here.
    pub fn new(settings: ConnectionSettings) -> Result<Self, ConfigurationError> {
        install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(settings.idle_timeout)
            .max_lifetime(settings.max_lifetime)
            .connect_lazy(&settings.url)
            .map_err(ConfigurationError::InvalidConnectionString)?;

        tracing::debug!(
            dialect = ?settings.dialect,
            max_connections = settings.max_connections,
            "Connection provider ready"
        );

        Ok(Self {
            pool,
            settings: Arc::new(settings),
        })
    }

    /// Take one connection from the pool.
    pub async fn acquire(&self) -> Result<PoolConnection<Any>, sqlx::Error> {
        self.pool.acquire().await
    }

    /// Open an explicit transaction on its own connection.
    pub async fn begin(&self) -> Result<Transaction<'static, Any>, sqlx::Error> {
        self.pool.begin().await
    }

    pub fn dialect(&self) -> Dialect {
        self.settings.dialect
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Connections currently open (idle or in use).
    pub fn open_connections(&self) -> u32 {
        self.pool.size()
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn construction_opens_nothing() {
        let provider = ConnectionProvider::new(ConnectionSettings::in_memory()).unwrap();
        assert_eq!(provider.open_connections(), 0);
        assert_eq!(provider.dialect(), Dialect::Sqlite);
    }

    #[tokio::test]
    async fn acquires_connection() {
        let provider = ConnectionProvider::new(ConnectionSettings::in_memory()).unwrap();
        let mut conn = provider.acquire().await.expect("acquire failed");

        let (one,): (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&mut *conn)
            .await
            .expect("query failed");
        assert_eq!(one, 1);
        assert_eq!(provider.open_connections(), 1);
    }

    // Run with: FLEET_TEST_MYSQL_URL=mysql://... cargo test -p fleet-server -- --ignored
    #[tokio::test]
    #[ignore = "requires database"]
    async fn mysql_pool_acquires_connection() {
        let url = std::env::var("FLEET_TEST_MYSQL_URL").expect("FLEET_TEST_MYSQL_URL required");
        let config = crate::config::DatabaseConfig {
            url: Some(url),
            ..Default::default()
        };
        let settings = ConnectionSettings::from_config(&config).expect("settings");
        let provider = ConnectionProvider::new(settings).expect("provider");

        let mut conn = provider.acquire().await.expect("acquire failed");
        let (one,): (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&mut *conn)
            .await
            .expect("query failed");
        assert_eq!(one, 1);
    }
}
