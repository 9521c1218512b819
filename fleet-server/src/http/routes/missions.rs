//! Mission endpoints
//!
//! Missions gather a driver, vehicles and job orders. Lifecycle actions:
//! `start`, `complete` (optional `{"completedOn"}`) and `cancel`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use fleet_core::{JobOrder, Mission, MissionNote, MissionStatus, Paginated, Vehicle};
use serde::Deserialize;

use super::created;
use super::maintenance::Completion;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverAssignment {
    pub driver_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAttachment {
    pub vehicle_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOrderAttachment {
    pub job_order_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub author_id: i64,
    pub text: String,
}

async fn list_missions(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Mission>>, ApiError> {
    Ok(Json(state.missions().list(page).await?))
}

async fn create_mission(
    State(state): State<Arc<AppState>>,
    ApiJson(mission): ApiJson<Mission>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.missions().create(&mission).await?;
    Ok(created(id))
}

async fn missions_by_status(
    State(state): State<Arc<AppState>>,
    ApiPath(status): ApiPath<MissionStatus>,
) -> Result<Json<Vec<Mission>>, ApiError> {
    Ok(Json(state.missions().list_by_status(status).await?))
}

async fn get_mission(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Mission>, ApiError> {
    Ok(Json(state.missions().get(id).await?))
}

async fn assign_driver(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(assignment): ApiJson<DriverAssignment>,
) -> Result<StatusCode, ApiError> {
    state
        .missions()
        .assign_driver(id, assignment.driver_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(state.missions().list_vehicles(id).await?))
}

async fn attach_vehicle(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(attachment): ApiJson<VehicleAttachment>,
) -> Result<StatusCode, ApiError> {
    state
        .missions()
        .attach_vehicle(id, attachment.vehicle_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn detach_vehicle(
    State(state): State<Arc<AppState>>,
    ApiPath((id, vehicle_id)): ApiPath<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state.missions().detach_vehicle(id, vehicle_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_job_orders(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<JobOrder>>, ApiError> {
    Ok(Json(state.missions().list_job_orders(id).await?))
}

async fn attach_job_order(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(attachment): ApiJson<JobOrderAttachment>,
) -> Result<StatusCode, ApiError> {
    state
        .missions()
        .attach_job_order(id, attachment.job_order_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_notes(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<MissionNote>>, ApiError> {
    Ok(Json(state.missions().list_notes(id).await?))
}

async fn add_note(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(note): ApiJson<NewNote>,
) -> Result<impl IntoResponse, ApiError> {
    let note_id = state
        .missions()
        .add_note(id, note.author_id, &note.text)
        .await?;
    Ok(created(note_id))
}

async fn start_mission(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.missions().start(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_mission(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    body: Option<Json<Completion>>,
) -> Result<StatusCode, ApiError> {
    let completion = body.map(|Json(c)| c).unwrap_or_default();
    state.missions().complete(id, completion.completed_on).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel_mission(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.missions().cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mission routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/missions", get(list_missions).post(create_mission))
        .route("/api/missions/by-status/{status}", get(missions_by_status))
        .route("/api/missions/{id}", get(get_mission))
        .route("/api/missions/{id}/driver", put(assign_driver))
        .route(
            "/api/missions/{id}/vehicles",
            get(list_vehicles).post(attach_vehicle),
        )
        .route(
            "/api/missions/{id}/vehicles/{vehicle_id}",
            delete(detach_vehicle),
        )
        .route(
            "/api/missions/{id}/job-orders",
            get(list_job_orders).post(attach_job_order),
        )
        .route("/api/missions/{id}/notes", get(list_notes).post(add_note))
        .route("/api/missions/{id}/start", post(start_mission))
        .route("/api/missions/{id}/complete", post(complete_mission))
        .route("/api/missions/{id}/cancel", post(cancel_mission))
}
