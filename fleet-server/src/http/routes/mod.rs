//! Route handlers organized by resource
//!
//! Create endpoints answer `201 {"id": n}`; state-changing actions answer
//! `204`. List endpoints take `?pageNumber=&pageSize=`.

pub mod applications;
pub mod buses;
pub mod drivers;
pub mod health;
pub mod inventory;
pub mod maintenance;
pub mod missions;
pub mod patrols;
pub mod users;
pub mod vacations;
pub mod vehicles;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of a 201 response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Created {
    pub id: i64,
}

pub(crate) fn created(id: i64) -> (StatusCode, Json<Created>) {
    (StatusCode::CREATED, Json(Created { id }))
}

/// `{"status": ...}` request body
#[derive(Debug, Deserialize)]
pub struct StatusChange<T> {
    pub status: T,
}
