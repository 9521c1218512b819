//! Maintenance records and maintenance applications

use chrono::NaiveDate;
use fleet_core::{
    ApplicationStatus, Maintenance, MaintenanceApplication, MaintenanceStatus, Page, Paginated,
};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::{get_date, get_enum, get_opt_date};
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Maintenance {
    const TABLE: &'static str = "maintenance";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &[
        "vehicle_id",
        "kind",
        "description",
        "cost",
        "scheduled_on",
        "completed_on",
        "status",
    ];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            kind: get_enum(row, "kind")?,
            description: row.try_get("description")?,
            cost: row.try_get("cost")?,
            scheduled_on: get_date(row, "scheduled_on")?,
            completed_on: get_opt_date(row, "completed_on")?,
            status: get_enum(row, "status")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.vehicle_id),
            SqlValue::stored(self.kind),
            SqlValue::from(&self.description),
            SqlValue::from(self.cost),
            SqlValue::from(self.scheduled_on),
            SqlValue::from(self.completed_on),
            SqlValue::stored(self.status),
        ]
    }
}

impl Keyed for Maintenance {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Maintenance record repository
pub struct MaintenanceRepo<S> {
    table: Table<Maintenance, S>,
}

impl<S: Session> MaintenanceRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, record: &Maintenance) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(record).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Maintenance>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Maintenance>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    /// History of one vehicle, most recent first.
    pub async fn list_for_vehicle(
        &mut self,
        vehicle_id: i64,
    ) -> Result<Vec<Maintenance>, DataAccessError> {
        self.table
            .find(
                Filter::eq("vehicle_id", vehicle_id),
                "scheduled_on DESC, id DESC",
                None,
            )
            .await
    }

    pub async fn list_by_status(
        &mut self,
        status: MaintenanceStatus,
    ) -> Result<Vec<Maintenance>, DataAccessError> {
        self.table
            .find(
                Filter::eq("status", SqlValue::stored(status)),
                "scheduled_on",
                None,
            )
            .await
    }

    /// Whether the vehicle has a scheduled or in-progress record.
    pub async fn has_open_for_vehicle(&mut self, vehicle_id: i64) -> Result<bool, DataAccessError> {
        self.table
            .exists(
                Filter::eq("vehicle_id", vehicle_id)
                    .and("status IN (@scheduled, @in_progress)")
                    .param("scheduled", SqlValue::stored(MaintenanceStatus::Scheduled))
                    .param("in_progress", SqlValue::stored(MaintenanceStatus::InProgress)),
            )
            .await
    }

    pub async fn update(&mut self, id: i64, record: &Maintenance) -> Result<bool, DataAccessError> {
        self.table.update(id, record).await
    }

    pub async fn update_status(
        &mut self,
        id: i64,
        status: MaintenanceStatus,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status",
                Filter::eq("id", id).param("status", SqlValue::stored(status)),
            )
            .await
    }

    /// Mark the record completed on `day`.
    pub async fn complete(&mut self, id: i64, day: NaiveDate) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status, completed_on = @day",
                Filter::eq("id", id)
                    .param("status", SqlValue::stored(MaintenanceStatus::Completed))
                    .param("day", day),
            )
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}

impl Record for MaintenanceApplication {
    const TABLE: &'static str = "maintenanceapplications";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &[
        "vehicle_id",
        "requested_by",
        "description",
        "submitted_on",
        "status",
        "maintenance_id",
    ];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            requested_by: row.try_get("requested_by")?,
            description: row.try_get("description")?,
            submitted_on: get_date(row, "submitted_on")?,
            status: get_enum(row, "status")?,
            maintenance_id: row.try_get("maintenance_id")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.vehicle_id),
            SqlValue::from(self.requested_by),
            SqlValue::from(&self.description),
            SqlValue::from(self.submitted_on),
            SqlValue::stored(self.status),
            SqlValue::from(self.maintenance_id),
        ]
    }
}

impl Keyed for MaintenanceApplication {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Maintenance application repository
pub struct MaintenanceApplicationRepo<S> {
    table: Table<MaintenanceApplication, S>,
}

impl<S: Session> MaintenanceApplicationRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(
        &mut self,
        application: &MaintenanceApplication,
    ) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(application).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<MaintenanceApplication>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn list(
        &mut self,
        page: Page,
    ) -> Result<Paginated<MaintenanceApplication>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    /// Pending applications, oldest first.
    pub async fn list_pending(&mut self) -> Result<Vec<MaintenanceApplication>, DataAccessError> {
        self.table
            .find(
                Filter::eq("status", SqlValue::stored(ApplicationStatus::Pending)),
                "submitted_on, id",
                None,
            )
            .await
    }

    pub async fn list_for_vehicle(
        &mut self,
        vehicle_id: i64,
    ) -> Result<Vec<MaintenanceApplication>, DataAccessError> {
        self.table
            .find(Filter::eq("vehicle_id", vehicle_id), "submitted_on DESC", None)
            .await
    }

    /// Record a decision on a still-pending application, optionally linking
    /// the maintenance record it produced. `false` if it was not pending.
    pub async fn decide(
        &mut self,
        id: i64,
        status: ApplicationStatus,
        maintenance_id: Option<i64>,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status, maintenance_id = @maintenance_id",
                Filter::eq("id", id)
                    .and("status = @pending")
                    .param("status", SqlValue::stored(status))
                    .param("maintenance_id", maintenance_id)
                    .param("pending", SqlValue::stored(ApplicationStatus::Pending)),
            )
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}
