//! Driver vacations

use chrono::NaiveDate;
use fleet_core::{Page, Paginated, Vacation, VacationStatus};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::{get_date, get_enum};
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Vacation {
    const TABLE: &'static str = "vacations";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] =
        &["driver_id", "start_date", "end_date", "reason", "status"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            driver_id: row.try_get("driver_id")?,
            start_date: get_date(row, "start_date")?,
            end_date: get_date(row, "end_date")?,
            reason: row.try_get("reason")?,
            status: get_enum(row, "status")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.driver_id),
            SqlValue::from(self.start_date),
            SqlValue::from(self.end_date),
            SqlValue::from(self.reason.clone()),
            SqlValue::stored(self.status),
        ]
    }
}

impl Keyed for Vacation {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Vacation repository
pub struct VacationRepo<S> {
    table: Table<Vacation, S>,
}

impl<S: Session> VacationRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, vacation: &Vacation) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(vacation).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Vacation>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Vacation>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_for_driver(&mut self, driver_id: i64) -> Result<Vec<Vacation>, DataAccessError> {
        self.table
            .find(Filter::eq("driver_id", driver_id), "start_date DESC", None)
            .await
    }

    pub async fn list_by_status(
        &mut self,
        status: VacationStatus,
    ) -> Result<Vec<Vacation>, DataAccessError> {
        self.table
            .find(Filter::eq("status", SqlValue::stored(status)), "start_date", None)
            .await
    }

    /// Whether the driver has an approved vacation intersecting `[start, end]`.
    pub async fn overlaps_approved(
        &mut self,
        driver_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, DataAccessError> {
        self.table
            .exists(
                Filter::eq("driver_id", driver_id)
                    .and_eq("status", SqlValue::stored(VacationStatus::Approved))
                    .and("start_date <= @end AND end_date >= @start")
                    .param("start", start)
                    .param("end", end),
            )
            .await
    }

    /// Decide a vacation still in `Requested`. `false` if already decided.
    pub async fn decide(&mut self, id: i64, status: VacationStatus) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @decision",
                Filter::eq("id", id)
                    .and_eq("status", SqlValue::stored(VacationStatus::Requested))
                    .param("decision", SqlValue::stored(status)),
            )
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}
