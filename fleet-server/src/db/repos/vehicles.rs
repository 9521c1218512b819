//! Vehicle repository
//!
//! Plate numbers are unique, so most lookups take a plate rather than a key.

use fleet_core::{Page, Paginated, Vehicle, VehicleStatus};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::get_enum;
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Vehicle {
    const TABLE: &'static str = "vehicles";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &[
        "plate_numbers",
        "manufacturer",
        "model",
        "year",
        "kind",
        "fuel",
        "status",
        "odometer_km",
    ];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            plate_numbers: row.try_get("plate_numbers")?,
            manufacturer: row.try_get("manufacturer")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            kind: get_enum(row, "kind")?,
            fuel: get_enum(row, "fuel")?,
            status: get_enum(row, "status")?,
            odometer_km: row.try_get("odometer_km")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(&self.plate_numbers),
            SqlValue::from(&self.manufacturer),
            SqlValue::from(&self.model),
            SqlValue::from(self.year),
            SqlValue::stored(self.kind),
            SqlValue::stored(self.fuel),
            SqlValue::stored(self.status),
            SqlValue::from(self.odometer_km),
        ]
    }
}

impl Keyed for Vehicle {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

fn by_plate(plate: &str) -> Filter {
    Filter::raw("plate_numbers = @plate").param("plate", plate)
}

fn by_status(status: VehicleStatus) -> Filter {
    Filter::eq("status", SqlValue::stored(status))
}

/// Vehicle repository
pub struct VehicleRepo<S> {
    table: Table<Vehicle, S>,
}

impl<S: Session> VehicleRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    /// Insert a vehicle, returning its generated key.
    pub async fn create(&mut self, vehicle: &Vehicle) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(vehicle).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Vehicle>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn get_vehicle_by_plate_numbers(
        &mut self,
        plate: &str,
    ) -> Result<Option<Vehicle>, DataAccessError> {
        self.table.find_one(by_plate(plate)).await
    }

    pub async fn is_vehicle_exists(&mut self, plate: &str) -> Result<bool, DataAccessError> {
        self.table.exists(by_plate(plate)).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Vehicle>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_by_status(
        &mut self,
        status: VehicleStatus,
    ) -> Result<Vec<Vehicle>, DataAccessError> {
        self.table.find(by_status(status), "plate_numbers", None).await
    }

    pub async fn count(&mut self) -> Result<i64, DataAccessError> {
        self.table.count(Filter::all()).await
    }

    pub async fn count_by_status(&mut self, status: VehicleStatus) -> Result<i64, DataAccessError> {
        self.table.count(by_status(status)).await
    }

    pub async fn update(&mut self, id: i64, vehicle: &Vehicle) -> Result<bool, DataAccessError> {
        self.table.update(id, vehicle).await
    }

    /// Overwrite the vehicle currently registered under `plate`.
    pub async fn update_by_plate(
        &mut self,
        plate: &str,
        vehicle: &Vehicle,
    ) -> Result<bool, DataAccessError> {
        self.table.update_matching(vehicle, by_plate(plate)).await
    }

    pub async fn update_status(
        &mut self,
        id: i64,
        status: VehicleStatus,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status",
                Filter::eq("id", id).param("status", SqlValue::stored(status)),
            )
            .await
    }

    /// Set every listed vehicle to `status`; returns how many were found.
    pub async fn update_status_many(
        &mut self,
        ids: &[i64],
        status: VehicleStatus,
    ) -> Result<usize, DataAccessError> {
        let mut updated = 0;
        for &id in ids {
            if self.update_status(id, status).await? {
                updated += 1;
            }
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }

    pub async fn delete_by_plate(&mut self, plate: &str) -> Result<bool, DataAccessError> {
        self.table.delete_where(by_plate(plate)).await
    }
}
