//! Bus endpoints
//!
//! A bus is created together with its vehicle row and removed with it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use fleet_core::{Bus, Paginated, Patrol};

use super::created;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery, ValidPlate};
use crate::http::server::AppState;
use crate::services::{BusDetails, NewBus};

async fn list_buses(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Bus>>, ApiError> {
    Ok(Json(state.buses().list(page).await?))
}

async fn create_bus(
    State(state): State<Arc<AppState>>,
    ApiJson(new_bus): ApiJson<NewBus>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.buses().create(new_bus).await?;
    Ok(created(id))
}

async fn buses_on_route(
    State(state): State<Arc<AppState>>,
    ApiPath(route_name): ApiPath<String>,
) -> Result<Json<Vec<Bus>>, ApiError> {
    Ok(Json(state.buses().list_by_route(&route_name).await?))
}

async fn get_bus(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BusDetails>, ApiError> {
    Ok(Json(state.buses().get(id).await?))
}

async fn get_bus_by_plate(
    State(state): State<Arc<AppState>>,
    ValidPlate(plate): ValidPlate,
) -> Result<Json<BusDetails>, ApiError> {
    Ok(Json(state.buses().get_by_plate(&plate).await?))
}

async fn delete_bus(
    State(state): State<Arc<AppState>>,
    ValidPlate(plate): ValidPlate,
) -> Result<StatusCode, ApiError> {
    state.buses().delete_by_plate(&plate).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn bus_patrols(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Patrol>>, ApiError> {
    Ok(Json(state.patrols().list_for_bus(id).await?))
}

/// Bus routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/buses", get(list_buses).post(create_bus))
        .route("/api/buses/by-route/{route}", get(buses_on_route))
        .route("/api/buses/{id}", get(get_bus))
        .route("/api/buses/{id}/patrols", get(bus_patrols))
        .route(
            "/api/buses/plate/{plate}",
            get(get_bus_by_plate).delete(delete_bus),
        )
}
