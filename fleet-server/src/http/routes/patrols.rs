//! Employee transport patrols and seat subscriptions

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use fleet_core::{Paginated, Patrol, PatrolSubscription};
use serde::Deserialize;

use super::created;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub employee_id: i64,
}

async fn list_patrols(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Patrol>>, ApiError> {
    Ok(Json(state.patrols().list(page).await?))
}

async fn create_patrol(
    State(state): State<Arc<AppState>>,
    ApiJson(patrol): ApiJson<Patrol>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.patrols().create(&patrol).await?;
    Ok(created(id))
}

async fn active_patrols(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Patrol>>, ApiError> {
    Ok(Json(state.patrols().list_active().await?))
}

async fn get_patrol(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Patrol>, ApiError> {
    Ok(Json(state.patrols().get(id).await?))
}

async fn suspend_patrol(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.patrols().suspend(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn resume_patrol(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.patrols().resume(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<PatrolSubscription>>, ApiError> {
    Ok(Json(state.patrols().subscriptions_for_patrol(id).await?))
}

async fn subscribe(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription_id = state.patrols().subscribe(id, request.employee_id).await?;
    Ok(created(subscription_id))
}

async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    ApiPath(subscription_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.patrols().unsubscribe(subscription_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Patrol routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/patrols", get(list_patrols).post(create_patrol))
        .route("/api/patrols/active", get(active_patrols))
        .route("/api/patrols/{id}", get(get_patrol))
        .route("/api/patrols/{id}/suspend", post(suspend_patrol))
        .route("/api/patrols/{id}/resume", post(resume_patrol))
        .route(
            "/api/patrols/{id}/subscriptions",
            get(list_subscriptions).post(subscribe),
        )
        .route("/api/subscriptions/{id}", delete(unsubscribe))
}
