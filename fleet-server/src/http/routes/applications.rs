//! Applications and the job orders created from them

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use fleet_core::{Application, ApplicationStatus, JobOrder, JobOrderStatus, Paginated};

use super::{created, StatusChange};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;

async fn list_applications(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Application>>, ApiError> {
    Ok(Json(state.applications().list(page).await?))
}

async fn submit_application(
    State(state): State<Arc<AppState>>,
    ApiJson(application): ApiJson<Application>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.applications().submit(&application).await?;
    Ok(created(id))
}

async fn applications_by_status(
    State(state): State<Arc<AppState>>,
    ApiPath(status): ApiPath<ApplicationStatus>,
) -> Result<Json<Vec<Application>>, ApiError> {
    Ok(Json(state.applications().list_by_status(status).await?))
}

async fn get_application(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Application>, ApiError> {
    Ok(Json(state.applications().get(id).await?))
}

/// Approving answers with the id of the new job order.
async fn approve_application(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let job_order_id = state.applications().approve(id).await?;
    Ok(created(job_order_id))
}

async fn reject_application(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.applications().reject(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn application_job_orders(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<JobOrder>>, ApiError> {
    Ok(Json(state.applications().job_orders_for_application(id).await?))
}

async fn list_job_orders(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<JobOrder>>, ApiError> {
    Ok(Json(state.applications().list_job_orders(page).await?))
}

async fn job_orders_by_status(
    State(state): State<Arc<AppState>>,
    ApiPath(status): ApiPath<JobOrderStatus>,
) -> Result<Json<Vec<JobOrder>>, ApiError> {
    Ok(Json(
        state.applications().list_job_orders_by_status(status).await?,
    ))
}

async fn get_job_order(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<JobOrder>, ApiError> {
    Ok(Json(state.applications().get_job_order(id).await?))
}

async fn move_job_order(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(change): ApiJson<StatusChange<JobOrderStatus>>,
) -> Result<StatusCode, ApiError> {
    state.applications().move_job_order(id, change.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn close_job_order(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.applications().close_job_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Application and job order routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/applications",
            get(list_applications).post(submit_application),
        )
        .route(
            "/api/applications/by-status/{status}",
            get(applications_by_status),
        )
        .route("/api/applications/{id}", get(get_application))
        .route("/api/applications/{id}/approve", post(approve_application))
        .route("/api/applications/{id}/reject", post(reject_application))
        .route(
            "/api/applications/{id}/job-orders",
            get(application_job_orders),
        )
        .route("/api/job-orders", get(list_job_orders))
        .route("/api/job-orders/by-status/{status}", get(job_orders_by_status))
        .route("/api/job-orders/{id}", get(get_job_order))
        .route("/api/job-orders/{id}/status", put(move_job_order))
        .route("/api/job-orders/{id}/close", post(close_job_order))
}
