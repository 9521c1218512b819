//! HTTP surface: status codes and JSON bodies through the full router

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use fleet_server::db::QueryExecutor;
use fleet_server::{build_router, AppState, HttpConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(executor: QueryExecutor) -> Router {
    build_router(Arc::new(AppState::new(executor)), &HttpConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn vehicle_body(plate: &str) -> Value {
    json!({
        "plateNumbers": plate,
        "manufacturer": "Volvo",
        "model": "FH16",
        "year": 2022,
        "kind": "Truck",
        "fuel": "Diesel"
    })
}

#[tokio::test]
async fn health_reports_version() {
    let app = app(common::executor().await);
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn vehicle_crud_over_http() {
    let app = app(common::executor().await);

    let (status, created) =
        send(&app, Method::POST, "/api/vehicles", Some(vehicle_body("ABC1234"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_i64().is_some());

    let (status, body) = send(&app, Method::GET, "/api/vehicles/exists/ABC1234", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);

    let (status, body) = send(&app, Method::GET, "/api/vehicles/ABC1234", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "FH16");
    assert_eq!(body["status"], "Available");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/vehicles/ABC1234/status",
        Some(json!({"status": "OutOfService"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, "/api/vehicles/count?status=OutOfService", None).await;
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, Method::DELETE, "/api/vehicles/ABC1234", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/api/vehicles/ABC1234", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn duplicate_create_is_409() {
    let app = app(common::executor().await);
    send(&app, Method::POST, "/api/vehicles", Some(vehicle_body("XYZ987"))).await;

    let (status, body) =
        send(&app, Method::POST, "/api/vehicles", Some(vehicle_body("XYZ987"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn malformed_body_is_400_json() {
    let app = app(common::executor().await);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/vehicles",
        Some(json!({"plateNumbers": "NOPE"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn unknown_enum_in_body_is_400() {
    let app = app(common::executor().await);
    let mut body = vehicle_body("ENM001");
    body["kind"] = json!("Spaceship");

    let (status, _) = send(&app, Method::POST, "/api/vehicles", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_listing_is_an_empty_page() {
    let app = app(common::executor().await);
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/vehicles?pageNumber=1&pageSize=10",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn page_zero_is_rejected_without_touching_the_database() {
    let executor = common::bare_executor();
    let app = app(executor.clone());

    let (status, body) = send(&app, Method::GET, "/api/vehicles?pageNumber=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(&app, Method::GET, "/api/users?pageSize=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(executor.provider().open_connections(), 0);
}

#[tokio::test]
async fn storage_failure_is_generic_500() {
    // No schema: every query fails in the driver.
    let app = app(common::bare_executor());
    let (status, body) = send(&app, Method::GET, "/api/vehicles", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(!body["message"].as_str().unwrap().contains("vehicles"));
}

#[tokio::test]
async fn application_approval_returns_job_order() {
    let app = app(common::executor().await);

    let (_, user) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"username": "dispatch", "fullName": "Dana Dispatch", "role": "Dispatcher"})),
    )
    .await;
    let (status, application) = send(
        &app,
        Method::POST,
        "/api/applications",
        Some(json!({
            "applicantId": user["id"],
            "kind": "Supply",
            "description": "Two pallets of coolant"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/applications/{}/approve", application["id"]);
    let (status, job_order) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/job-orders/{}", job_order["id"]);
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Open");
}

#[tokio::test]
async fn bad_path_id_is_400() {
    let app = app(common::executor().await);
    let (status, body) = send(&app, Method::GET, "/api/users/not-a-number", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
