//! Maintenance records and maintenance applications
//!
//! Records:
//! - GET  /api/maintenance                       - Paginated list
//! - POST /api/maintenance                       - Schedule work on a vehicle
//! - GET  /api/maintenance/{id}
//! - POST /api/maintenance/{id}/start
//! - POST /api/maintenance/{id}/complete         - Optional `{"completedOn"}`
//! - POST /api/maintenance/{id}/cancel
//!
//! Applications:
//! - GET  /api/maintenance-applications
//! - POST /api/maintenance-applications
//! - GET  /api/maintenance-applications/pending
//! - GET  /api/maintenance-applications/{id}
//! - POST /api/maintenance-applications/{id}/approve   - Body: terms
//! - POST /api/maintenance-applications/{id}/reject

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use fleet_core::{Maintenance, MaintenanceApplication, MaintenanceStatus, Paginated};
use serde::Deserialize;

use super::created;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;
use crate::services::MaintenanceTerms;

/// Optional completion body; today when absent
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub completed_on: Option<NaiveDate>,
}

async fn list_maintenance(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Maintenance>>, ApiError> {
    Ok(Json(state.maintenance().list(page).await?))
}

async fn schedule_maintenance(
    State(state): State<Arc<AppState>>,
    ApiJson(record): ApiJson<Maintenance>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.maintenance().schedule(&record).await?;
    Ok(created(id))
}

async fn maintenance_by_status(
    State(state): State<Arc<AppState>>,
    ApiPath(status): ApiPath<MaintenanceStatus>,
) -> Result<Json<Vec<Maintenance>>, ApiError> {
    Ok(Json(state.maintenance().list_by_status(status).await?))
}

async fn maintenance_for_vehicle(
    State(state): State<Arc<AppState>>,
    ApiPath(vehicle_id): ApiPath<i64>,
) -> Result<Json<Vec<Maintenance>>, ApiError> {
    Ok(Json(state.maintenance().list_for_vehicle(vehicle_id).await?))
}

async fn get_maintenance(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Maintenance>, ApiError> {
    Ok(Json(state.maintenance().get(id).await?))
}

async fn start_maintenance(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.maintenance().start(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_maintenance(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    body: Option<Json<Completion>>,
) -> Result<StatusCode, ApiError> {
    // No body (or no JSON content type) means "today"
    let completion = body.map(|Json(c)| c).unwrap_or_default();
    state
        .maintenance()
        .complete(id, completion.completed_on)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel_maintenance(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.maintenance().cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_applications(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<MaintenanceApplication>>, ApiError> {
    Ok(Json(state.maintenance().list_applications(page).await?))
}

async fn submit_application(
    State(state): State<Arc<AppState>>,
    ApiJson(application): ApiJson<MaintenanceApplication>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.maintenance().submit_application(&application).await?;
    Ok(created(id))
}

async fn pending_applications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MaintenanceApplication>>, ApiError> {
    Ok(Json(state.maintenance().list_pending_applications().await?))
}

async fn applications_for_vehicle(
    State(state): State<Arc<AppState>>,
    ApiPath(vehicle_id): ApiPath<i64>,
) -> Result<Json<Vec<MaintenanceApplication>>, ApiError> {
    Ok(Json(
        state
            .maintenance()
            .list_applications_for_vehicle(vehicle_id)
            .await?,
    ))
}

async fn get_application(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MaintenanceApplication>, ApiError> {
    Ok(Json(state.maintenance().get_application(id).await?))
}

async fn approve_application(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(terms): ApiJson<MaintenanceTerms>,
) -> Result<impl IntoResponse, ApiError> {
    let maintenance_id = state.maintenance().approve_application(id, terms).await?;
    Ok(created(maintenance_id))
}

async fn reject_application(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.maintenance().reject_application(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Maintenance routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/maintenance",
            get(list_maintenance).post(schedule_maintenance),
        )
        .route(
            "/api/maintenance/by-status/{status}",
            get(maintenance_by_status),
        )
        .route(
            "/api/maintenance/vehicle/{vehicle_id}",
            get(maintenance_for_vehicle),
        )
        .route("/api/maintenance/{id}", get(get_maintenance))
        .route("/api/maintenance/{id}/start", post(start_maintenance))
        .route("/api/maintenance/{id}/complete", post(complete_maintenance))
        .route("/api/maintenance/{id}/cancel", post(cancel_maintenance))
        .route(
            "/api/maintenance-applications",
            get(list_applications).post(submit_application),
        )
        .route(
            "/api/maintenance-applications/pending",
            get(pending_applications),
        )
        .route(
            "/api/maintenance-applications/vehicle/{vehicle_id}",
            get(applications_for_vehicle),
        )
        .route("/api/maintenance-applications/{id}", get(get_application))
        .route(
            "/api/maintenance-applications/{id}/approve",
            post(approve_application),
        )
        .route(
            "/api/maintenance-applications/{id}/reject",
            post(reject_application),
        )
}
