//! Applications and the job orders raised from them

use chrono::NaiveDate;
use fleet_core::{Application, ApplicationStatus, JobOrder, JobOrderStatus, Page, Paginated};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::{get_date, get_enum, get_opt_date};
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Application {
    const TABLE: &'static str = "applications";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &[
        "applicant_id",
        "vehicle_id",
        "kind",
        "description",
        "submitted_on",
        "status",
    ];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            applicant_id: row.try_get("applicant_id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            kind: get_enum(row, "kind")?,
            description: row.try_get("description")?,
            submitted_on: get_date(row, "submitted_on")?,
            status: get_enum(row, "status")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.applicant_id),
            SqlValue::from(self.vehicle_id),
            SqlValue::stored(self.kind),
            SqlValue::from(&self.description),
            SqlValue::from(self.submitted_on),
            SqlValue::stored(self.status),
        ]
    }
}

impl Keyed for Application {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Application repository
pub struct ApplicationRepo<S> {
    table: Table<Application, S>,
}

impl<S: Session> ApplicationRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, application: &Application) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(application).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Application>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Application>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_by_status(
        &mut self,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, DataAccessError> {
        self.table
            .find(
                Filter::eq("status", SqlValue::stored(status)),
                "submitted_on, id",
                None,
            )
            .await
    }

    pub async fn list_for_applicant(
        &mut self,
        applicant_id: i64,
    ) -> Result<Vec<Application>, DataAccessError> {
        self.table
            .find(
                Filter::eq("applicant_id", applicant_id),
                "submitted_on DESC, id DESC",
                None,
            )
            .await
    }

    /// Move a pending application to `status`. `false` if it was not pending.
    pub async fn update_status(
        &mut self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status",
                Filter::eq("id", id)
                    .and("status = @pending")
                    .param("status", SqlValue::stored(status))
                    .param("pending", SqlValue::stored(ApplicationStatus::Pending)),
            )
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}

impl Record for JobOrder {
    const TABLE: &'static str = "joborders";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &[
        "application_id",
        "vehicle_id",
        "title",
        "description",
        "opened_on",
        "closed_on",
        "status",
    ];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            application_id: row.try_get("application_id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            opened_on: get_date(row, "opened_on")?,
            closed_on: get_opt_date(row, "closed_on")?,
            status: get_enum(row, "status")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.application_id),
            SqlValue::from(self.vehicle_id),
            SqlValue::from(&self.title),
            SqlValue::from(&self.description),
            SqlValue::from(self.opened_on),
            SqlValue::from(self.closed_on),
            SqlValue::stored(self.status),
        ]
    }
}

impl Keyed for JobOrder {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Job order repository
pub struct JobOrderRepo<S> {
    table: Table<JobOrder, S>,
}

impl<S: Session> JobOrderRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, order: &JobOrder) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(order).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<JobOrder>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<JobOrder>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_by_status(
        &mut self,
        status: JobOrderStatus,
    ) -> Result<Vec<JobOrder>, DataAccessError> {
        self.table
            .find(Filter::eq("status", SqlValue::stored(status)), "opened_on, id", None)
            .await
    }

    pub async fn list_for_application(
        &mut self,
        application_id: i64,
    ) -> Result<Vec<JobOrder>, DataAccessError> {
        self.table
            .find(Filter::eq("application_id", application_id), "id", None)
            .await
    }

    pub async fn update_status(
        &mut self,
        id: i64,
        status: JobOrderStatus,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status",
                Filter::eq("id", id).param("status", SqlValue::stored(status)),
            )
            .await
    }

    /// Set a final status and the closing date.
    pub async fn close(
        &mut self,
        id: i64,
        status: JobOrderStatus,
        day: NaiveDate,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status, closed_on = @day",
                Filter::eq("id", id)
                    .param("status", SqlValue::stored(status))
                    .param("day", day),
            )
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}
