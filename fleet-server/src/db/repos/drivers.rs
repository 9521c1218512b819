//! Driver repository

use chrono::NaiveDate;
use fleet_core::{Driver, DriverStatus, Page, Paginated};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::{get_date, get_enum};
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Driver {
    const TABLE: &'static str = "drivers";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &[
        "full_name",
        "license_number",
        "license_expiry",
        "phone",
        "status",
        "vehicle_id",
    ];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            license_number: row.try_get("license_number")?,
            license_expiry: get_date(row, "license_expiry")?,
            phone: row.try_get("phone")?,
            status: get_enum(row, "status")?,
            vehicle_id: row.try_get("vehicle_id")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(&self.full_name),
            SqlValue::from(&self.license_number),
            SqlValue::from(self.license_expiry),
            SqlValue::from(self.phone.clone()),
            SqlValue::stored(self.status),
            SqlValue::from(self.vehicle_id),
        ]
    }
}

impl Keyed for Driver {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Driver repository
pub struct DriverRepo<S> {
    table: Table<Driver, S>,
}

impl<S: Session> DriverRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, driver: &Driver) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(driver).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Driver>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn get_by_license(&mut self, license: &str) -> Result<Option<Driver>, DataAccessError> {
        self.table.find_one(Filter::eq("license_number", license)).await
    }

    pub async fn license_exists(&mut self, license: &str) -> Result<bool, DataAccessError> {
        self.table.exists(Filter::eq("license_number", license)).await
    }

    /// Driver currently holding `vehicle_id`, if any.
    pub async fn get_by_vehicle(&mut self, vehicle_id: i64) -> Result<Option<Driver>, DataAccessError> {
        self.table.find_one(Filter::eq("vehicle_id", vehicle_id)).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Driver>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_available(&mut self) -> Result<Vec<Driver>, DataAccessError> {
        self.table
            .find(
                Filter::eq("status", SqlValue::stored(DriverStatus::Available)),
                "full_name",
                None,
            )
            .await
    }

    /// Drivers whose license expires strictly before `day`.
    pub async fn licenses_expiring_before(
        &mut self,
        day: NaiveDate,
    ) -> Result<Vec<Driver>, DataAccessError> {
        self.table
            .find(
                Filter::raw("license_expiry < @day").param("day", day),
                "license_expiry",
                None,
            )
            .await
    }

    pub async fn update(&mut self, id: i64, driver: &Driver) -> Result<bool, DataAccessError> {
        self.table.update(id, driver).await
    }

    pub async fn update_status(
        &mut self,
        id: i64,
        status: DriverStatus,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status",
                Filter::eq("id", id).param("status", SqlValue::stored(status)),
            )
            .await
    }

    pub async fn assign_vehicle(&mut self, id: i64, vehicle_id: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "vehicle_id = @vehicle_id",
                Filter::eq("id", id).param("vehicle_id", vehicle_id),
            )
            .await
    }

    pub async fn unassign_vehicle(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where("vehicle_id = NULL", Filter::eq("id", id))
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}
