//! Driver vacation requests and their decisions

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use fleet_core::{Paginated, Vacation, VacationStatus};

use super::created;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;

async fn list_vacations(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Vacation>>, ApiError> {
    Ok(Json(state.vacations().list(page).await?))
}

async fn request_vacation(
    State(state): State<Arc<AppState>>,
    ApiJson(vacation): ApiJson<Vacation>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.vacations().request(&vacation).await?;
    Ok(created(id))
}

async fn vacations_by_status(
    State(state): State<Arc<AppState>>,
    ApiPath(status): ApiPath<VacationStatus>,
) -> Result<Json<Vec<Vacation>>, ApiError> {
    Ok(Json(state.vacations().list_by_status(status).await?))
}

async fn get_vacation(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vacation>, ApiError> {
    Ok(Json(state.vacations().get(id).await?))
}

async fn approve_vacation(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.vacations().approve(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reject_vacation(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.vacations().reject(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Vacation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/vacations", get(list_vacations).post(request_vacation))
        .route("/api/vacations/by-status/{status}", get(vacations_by_status))
        .route("/api/vacations/{id}", get(get_vacation))
        .route("/api/vacations/{id}/approve", post(approve_vacation))
        .route("/api/vacations/{id}/reject", post(reject_vacation))
}
