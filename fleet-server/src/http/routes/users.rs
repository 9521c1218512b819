//! User account endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use fleet_core::{Application, Paginated, PatrolSubscription, User, UserRole};

use super::created;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;

async fn list_users(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<User>>, ApiError> {
    Ok(Json(state.users().list(page).await?))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(user): ApiJson<User>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.users().create(&user).await?;
    Ok(created(id))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users().get(id).await?))
}

async fn get_user_by_username(
    State(state): State<Arc<AppState>>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users().get_by_username(&username).await?))
}

async fn users_by_role(
    State(state): State<Arc<AppState>>,
    ApiPath(role): ApiPath<UserRole>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users().list_by_role(role).await?))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(user): ApiJson<User>,
) -> Result<StatusCode, ApiError> {
    state.users().update(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.users().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn user_applications(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Application>>, ApiError> {
    Ok(Json(state.applications().list_for_applicant(id).await?))
}

async fn user_subscriptions(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<PatrolSubscription>>, ApiError> {
    Ok(Json(state.patrols().subscriptions_for_employee(id).await?))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/by-username/{username}", get(get_user_by_username))
        .route("/api/users/by-role/{role}", get(users_by_role))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/{id}/applications", get(user_applications))
        .route("/api/users/{id}/subscriptions", get(user_subscriptions))
}
