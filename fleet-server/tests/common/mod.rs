//! Shared fixtures for integration tests
//!
//! Every test gets its own in-memory SQLite database with the full schema,
//! or a temp-file database when it needs more than one connection.

#![allow(dead_code)]

use chrono::NaiveDate;
use fleet_core::{Driver, DriverStatus, FuelType, User, UserRole, Vehicle, VehicleKind, VehicleStatus};
use fleet_server::config::DatabaseConfig;
use fleet_server::db::migrations;
use fleet_server::{ConnectionProvider, ConnectionSettings, QueryExecutor};
use tempfile::TempDir;

/// Executor over a fresh database, schema not yet created.
pub fn bare_executor() -> QueryExecutor {
    let provider = ConnectionProvider::new(ConnectionSettings::in_memory()).unwrap();
    QueryExecutor::new(provider)
}

/// Executor over a fresh database with every table created.
pub async fn executor() -> QueryExecutor {
    let executor = bare_executor();
    migrations::run(&executor).await.unwrap();
    executor
}

/// Executor over a SQLite file in a fresh temp dir, with a pool of
/// `max_connections` so statements really run side by side. Keep the
/// returned dir alive for as long as the executor is used.
pub async fn file_executor(max_connections: u32) -> (TempDir, QueryExecutor) {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: Some(format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("fleet.db").display()
        )),
        max_connections,
        ..Default::default()
    };
    let settings = ConnectionSettings::from_config(&config).unwrap();
    let executor = QueryExecutor::new(ConnectionProvider::new(settings).unwrap());
    migrations::run(&executor).await.unwrap();
    (dir, executor)
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn vehicle(plate: &str) -> Vehicle {
    Vehicle {
        id: None,
        plate_numbers: plate.into(),
        manufacturer: "Toyota".into(),
        model: "Coaster".into(),
        year: 2020,
        kind: VehicleKind::Van,
        fuel: FuelType::Diesel,
        status: VehicleStatus::Available,
        odometer_km: 41_500,
    }
}

pub fn user(username: &str) -> User {
    User {
        id: None,
        username: username.into(),
        full_name: "Test User".into(),
        email: Some(format!("{username}@example.com")),
        phone: None,
        role: UserRole::Employee,
        created_on: day(2024, 1, 1),
    }
}

pub fn driver(license: &str) -> Driver {
    Driver {
        id: None,
        full_name: "Sam Driver".into(),
        license_number: license.into(),
        license_expiry: day(2030, 6, 30),
        phone: None,
        status: DriverStatus::Available,
        vehicle_id: None,
    }
}
