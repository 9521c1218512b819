//! Spare parts and consumables stock
//!
//! Both stocks share the same shape: CRUD plus `restock` / `withdraw` with
//! an `{"amount": n}` body. Stock movements answer with the updated item.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use fleet_core::{Consumable, Paginated, SparePart};
use serde::Deserialize;

use super::created;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, PageQuery};
use crate::http::server::AppState;
use crate::services::LowStockReport;

#[derive(Debug, Deserialize)]
pub struct StockMovement {
    pub amount: i64,
}

async fn low_stock(State(state): State<Arc<AppState>>) -> Result<Json<LowStockReport>, ApiError> {
    Ok(Json(state.inventory().low_stock_report().await?))
}

// Spare parts

async fn list_parts(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<SparePart>>, ApiError> {
    Ok(Json(state.inventory().list_parts(page).await?))
}

async fn create_part(
    State(state): State<Arc<AppState>>,
    ApiJson(part): ApiJson<SparePart>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.inventory().create_part(&part).await?;
    Ok(created(id))
}

async fn get_part_by_number(
    State(state): State<Arc<AppState>>,
    ApiPath(part_number): ApiPath<String>,
) -> Result<Json<SparePart>, ApiError> {
    Ok(Json(state.inventory().get_part_by_number(&part_number).await?))
}

async fn get_part(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<SparePart>, ApiError> {
    Ok(Json(state.inventory().get_part(id).await?))
}

async fn update_part(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(part): ApiJson<SparePart>,
) -> Result<StatusCode, ApiError> {
    state.inventory().update_part(id, &part).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_part(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.inventory().delete_part(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn restock_part(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(movement): ApiJson<StockMovement>,
) -> Result<Json<SparePart>, ApiError> {
    Ok(Json(
        state.inventory().restock_part(id, movement.amount).await?,
    ))
}

async fn withdraw_part(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(movement): ApiJson<StockMovement>,
) -> Result<Json<SparePart>, ApiError> {
    Ok(Json(
        state.inventory().withdraw_part(id, movement.amount).await?,
    ))
}

// Consumables

async fn list_consumables(
    State(state): State<Arc<AppState>>,
    PageQuery(page): PageQuery,
) -> Result<Json<Paginated<Consumable>>, ApiError> {
    Ok(Json(state.inventory().list_consumables(page).await?))
}

async fn create_consumable(
    State(state): State<Arc<AppState>>,
    ApiJson(item): ApiJson<Consumable>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.inventory().create_consumable(&item).await?;
    Ok(created(id))
}

async fn get_consumable_by_name(
    State(state): State<Arc<AppState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Consumable>, ApiError> {
    Ok(Json(state.inventory().get_consumable_by_name(&name).await?))
}

async fn get_consumable(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Consumable>, ApiError> {
    Ok(Json(state.inventory().get_consumable(id).await?))
}

async fn update_consumable(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(item): ApiJson<Consumable>,
) -> Result<StatusCode, ApiError> {
    state.inventory().update_consumable(id, &item).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_consumable(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.inventory().delete_consumable(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn restock_consumable(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(movement): ApiJson<StockMovement>,
) -> Result<Json<Consumable>, ApiError> {
    Ok(Json(
        state
            .inventory()
            .restock_consumable(id, movement.amount)
            .await?,
    ))
}

async fn withdraw_consumable(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(movement): ApiJson<StockMovement>,
) -> Result<Json<Consumable>, ApiError> {
    Ok(Json(
        state
            .inventory()
            .withdraw_consumable(id, movement.amount)
            .await?,
    ))
}

/// Inventory routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/inventory/low-stock", get(low_stock))
        .route("/api/spare-parts", get(list_parts).post(create_part))
        .route(
            "/api/spare-parts/by-number/{part_number}",
            get(get_part_by_number),
        )
        .route(
            "/api/spare-parts/{id}",
            get(get_part).put(update_part).delete(delete_part),
        )
        .route("/api/spare-parts/{id}/restock", post(restock_part))
        .route("/api/spare-parts/{id}/withdraw", post(withdraw_part))
        .route(
            "/api/consumables",
            get(list_consumables).post(create_consumable),
        )
        .route(
            "/api/consumables/by-name/{name}",
            get(get_consumable_by_name),
        )
        .route(
            "/api/consumables/{id}",
            get(get_consumable).put(update_consumable).delete(delete_consumable),
        )
        .route("/api/consumables/{id}/restock", post(restock_consumable))
        .route("/api/consumables/{id}/withdraw", post(withdraw_consumable))
}
