//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::HttpConfig;
use crate::db::QueryExecutor;
use crate::services::{
    ApplicationService, BusService, DriverService, InventoryService, MaintenanceService,
    MissionService, PatrolService, UserService, VacationService, VehicleService,
};

/// Shared application state
///
/// Only the executor is shared; services are built per request around a
/// clone of it.
#[derive(Clone)]
pub struct AppState {
    pub executor: QueryExecutor,
}

impl AppState {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.executor.clone())
    }

    pub fn vehicles(&self) -> VehicleService {
        VehicleService::new(self.executor.clone())
    }

    pub fn buses(&self) -> BusService {
        BusService::new(self.executor.clone())
    }

    pub fn drivers(&self) -> DriverService {
        DriverService::new(self.executor.clone())
    }

    pub fn vacations(&self) -> VacationService {
        VacationService::new(self.executor.clone())
    }

    pub fn maintenance(&self) -> MaintenanceService {
        MaintenanceService::new(self.executor.clone())
    }

    pub fn applications(&self) -> ApplicationService {
        ApplicationService::new(self.executor.clone())
    }

    pub fn missions(&self) -> MissionService {
        MissionService::new(self.executor.clone())
    }

    pub fn patrols(&self) -> PatrolService {
        PatrolService::new(self.executor.clone())
    }

    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.executor.clone())
    }
}

/// Build the full application router.
pub fn build_router(state: Arc<AppState>, config: &HttpConfig) -> Router {
    // CORS configuration
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:5080"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:5080"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::vehicles::router())
        .merge(routes::buses::router())
        .merge(routes::drivers::router())
        .merge(routes::vacations::router())
        .merge(routes::maintenance::router())
        .merge(routes::applications::router())
        .merge(routes::missions::router())
        .merge(routes::patrols::router())
        .merge(routes::inventory::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let executor = QueryExecutor::new(ConnectionProvider::new(settings)?);
/// run_server(executor, HttpConfig::default()).await?;
/// ```
pub async fn run_server(executor: QueryExecutor, config: HttpConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(executor.clone()));
    let app = build_router(state, &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    executor.provider().close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
