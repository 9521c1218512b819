//! Vehicle endpoints, addressed by plate numbers
//!
//! - GET    /api/vehicles                      - Paginated list
//! - POST   /api/vehicles                      - Register a vehicle
//! - GET    /api/vehicles/count?status=        - Count, optionally by status
//! - GET    /api/vehicles/exists/{plate}       - Plate lookup without 404
//! - GET    /api/vehicles/by-status/{status}   - All vehicles in a state
//! - GET    /api/vehicles/{plate}              - Vehicle details
//! - PUT    /api/vehicles/{plate}              - Replace stored fields
//! - DELETE /api/vehicles/{plate}              - Remove a vehicle
//! - PUT    /api/vehicles/{plate}/status       - Change operational status

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use fleet_core::{Paginated, Vehicle, VehicleStatus};
use serde::{Deserialize, Serialize};

use super::{created, StatusChange};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery, ValidPlate};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Vehicle>>, ApiError> {
    Ok(Json(state.vehicles().list(page).await?))
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    ApiJson(vehicle): ApiJson<Vehicle>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.vehicles().create(&vehicle).await?;
    Ok(created(id))
}

async fn count_vehicles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state.vehicles().count(query.status).await?;
    Ok(Json(CountResponse { count }))
}

async fn vehicle_exists(
    State(state): State<Arc<AppState>>,
    ValidPlate(plate): ValidPlate,
) -> Result<Json<ExistsResponse>, ApiError> {
    let exists = state.vehicles().exists(&plate).await?;
    Ok(Json(ExistsResponse { exists }))
}

async fn vehicles_by_status(
    State(state): State<Arc<AppState>>,
    ApiPath(status): ApiPath<VehicleStatus>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(state.vehicles().list_by_status(status).await?))
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    ValidPlate(plate): ValidPlate,
) -> Result<Json<Vehicle>, ApiError> {
    Ok(Json(state.vehicles().get_by_plate(&plate).await?))
}

async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    ValidPlate(plate): ValidPlate,
    ApiJson(vehicle): ApiJson<Vehicle>,
) -> Result<StatusCode, ApiError> {
    state.vehicles().update(&plate, &vehicle).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    ValidPlate(plate): ValidPlate,
) -> Result<StatusCode, ApiError> {
    state.vehicles().delete(&plate).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_vehicle_status(
    State(state): State<Arc<AppState>>,
    ValidPlate(plate): ValidPlate,
    ApiJson(change): ApiJson<StatusChange<VehicleStatus>>,
) -> Result<StatusCode, ApiError> {
    state.vehicles().set_status(&plate, change.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Vehicle routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/vehicles", get(list_vehicles).post(create_vehicle))
        .route("/api/vehicles/count", get(count_vehicles))
        .route("/api/vehicles/exists/{plate}", get(vehicle_exists))
        .route("/api/vehicles/by-status/{status}", get(vehicles_by_status))
        .route(
            "/api/vehicles/{plate}",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/api/vehicles/{plate}/status", put(set_vehicle_status))
}
