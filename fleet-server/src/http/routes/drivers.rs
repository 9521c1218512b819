//! Driver endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use fleet_core::{Driver, DriverStatus, Mission, Paginated, Vacation};
use serde::Deserialize;

use super::{created, StatusChange};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAssignment {
    pub vehicle_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub before: NaiveDate,
}

async fn list_drivers(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Driver>>, ApiError> {
    Ok(Json(state.drivers().list(page).await?))
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    ApiJson(driver): ApiJson<Driver>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.drivers().create(&driver).await?;
    Ok(created(id))
}

async fn available_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Driver>>, ApiError> {
    Ok(Json(state.drivers().list_available().await?))
}

async fn expiring_licenses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<Driver>>, ApiError> {
    Ok(Json(
        state.drivers().licenses_expiring_before(query.before).await?,
    ))
}

async fn get_driver_by_license(
    State(state): State<Arc<AppState>>,
    ApiPath(license): ApiPath<String>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(state.drivers().get_by_license(&license).await?))
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(state.drivers().get(id).await?))
}

async fn update_driver(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(driver): ApiJson<Driver>,
) -> Result<StatusCode, ApiError> {
    state.drivers().update(id, &driver).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_driver(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.drivers().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_driver_status(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(change): ApiJson<StatusChange<DriverStatus>>,
) -> Result<StatusCode, ApiError> {
    state.drivers().set_status(id, change.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn assign_vehicle(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(assignment): ApiJson<VehicleAssignment>,
) -> Result<StatusCode, ApiError> {
    state
        .drivers()
        .assign_vehicle(id, assignment.vehicle_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn release_vehicle(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.drivers().release_vehicle(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn driver_vacations(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Vacation>>, ApiError> {
    Ok(Json(state.vacations().list_for_driver(id).await?))
}

async fn driver_missions(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Mission>>, ApiError> {
    Ok(Json(state.missions().list_for_driver(id).await?))
}

/// Driver routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/drivers", get(list_drivers).post(create_driver))
        .route("/api/drivers/available", get(available_drivers))
        .route("/api/drivers/expiring", get(expiring_licenses))
        .route("/api/drivers/by-license/{license}", get(get_driver_by_license))
        .route(
            "/api/drivers/{id}",
            get(get_driver).put(update_driver).delete(delete_driver),
        )
        .route("/api/drivers/{id}/status", put(set_driver_status))
        .route(
            "/api/drivers/{id}/vehicle",
            put(assign_vehicle).delete(release_vehicle),
        )
        .route("/api/drivers/{id}/vacations", get(driver_vacations))
        .route("/api/drivers/{id}/missions", get(driver_missions))
}
