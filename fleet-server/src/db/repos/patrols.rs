//! Patrols (scheduled bus runs) and employee subscriptions to them

use fleet_core::{Page, Paginated, Patrol, PatrolStatus, PatrolSubscription, SubscriptionStatus};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::{get_date, get_enum};
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Patrol {
    const TABLE: &'static str = "patrols";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] =
        &["bus_id", "name", "route", "departure_time", "status"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            bus_id: row.try_get("bus_id")?,
            name: row.try_get("name")?,
            route: row.try_get("route")?,
            departure_time: row.try_get("departure_time")?,
            status: get_enum(row, "status")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.bus_id),
            SqlValue::from(&self.name),
            SqlValue::from(&self.route),
            SqlValue::from(&self.departure_time),
            SqlValue::stored(self.status),
        ]
    }
}

impl Keyed for Patrol {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Patrol repository
pub struct PatrolRepo<S> {
    table: Table<Patrol, S>,
}

impl<S: Session> PatrolRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, patrol: &Patrol) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(patrol).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Patrol>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Patrol>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    /// Active patrols by departure time.
    pub async fn list_active(&mut self) -> Result<Vec<Patrol>, DataAccessError> {
        self.table
            .find(
                Filter::eq("status", SqlValue::stored(PatrolStatus::Active)),
                "departure_time, id",
                None,
            )
            .await
    }

    pub async fn list_for_bus(&mut self, bus_id: i64) -> Result<Vec<Patrol>, DataAccessError> {
        self.table
            .find(Filter::eq("bus_id", bus_id), "departure_time, id", None)
            .await
    }

    pub async fn update(&mut self, id: i64, patrol: &Patrol) -> Result<bool, DataAccessError> {
        self.table.update(id, patrol).await
    }

    pub async fn update_status(
        &mut self,
        id: i64,
        status: PatrolStatus,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status",
                Filter::eq("id", id).param("status", SqlValue::stored(status)),
            )
            .await
    }

    /// Take a write lock on the patrol row for the rest of the transaction,
    /// serializing subscribers. A no-op outside a transaction.
    pub async fn lock(&mut self, id: i64) -> Result<(), DataAccessError> {
        self.table
            .update_where("status = status", Filter::eq("id", id))
            .await
            .map(|_| ())
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}

impl Record for PatrolSubscription {
    const TABLE: &'static str = "patrolssubscriptions";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] =
        &["patrol_id", "employee_id", "subscribed_on", "status"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            patrol_id: row.try_get("patrol_id")?,
            employee_id: row.try_get("employee_id")?,
            subscribed_on: get_date(row, "subscribed_on")?,
            status: get_enum(row, "status")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.patrol_id),
            SqlValue::from(self.employee_id),
            SqlValue::from(self.subscribed_on),
            SqlValue::stored(self.status),
        ]
    }
}

impl Keyed for PatrolSubscription {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

fn active() -> SqlValue {
    SqlValue::stored(SubscriptionStatus::Active)
}

/// Patrol subscription repository
pub struct SubscriptionRepo<S> {
    table: Table<PatrolSubscription, S>,
}

impl<S: Session> SubscriptionRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(
        &mut self,
        subscription: &PatrolSubscription,
    ) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(subscription).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<PatrolSubscription>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn count_active_for_patrol(&mut self, patrol_id: i64) -> Result<i64, DataAccessError> {
        self.table
            .count(Filter::eq("patrol_id", patrol_id).and_eq("status", active()))
            .await
    }

    pub async fn list_for_patrol(
        &mut self,
        patrol_id: i64,
    ) -> Result<Vec<PatrolSubscription>, DataAccessError> {
        self.table
            .find(Filter::eq("patrol_id", patrol_id), "subscribed_on, id", None)
            .await
    }

    pub async fn list_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<PatrolSubscription>, DataAccessError> {
        self.table
            .find(Filter::eq("employee_id", employee_id), "subscribed_on DESC, id DESC", None)
            .await
    }

    pub async fn exists_active(
        &mut self,
        employee_id: i64,
        patrol_id: i64,
    ) -> Result<bool, DataAccessError> {
        self.table
            .exists(
                Filter::eq("employee_id", employee_id)
                    .and_eq("patrol_id", patrol_id)
                    .and_eq("status", active()),
            )
            .await
    }

    /// Cancel an active subscription. `false` if none was active.
    pub async fn cancel(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @cancelled",
                Filter::eq("id", id)
                    .and_eq("status", active())
                    .param("cancelled", SqlValue::stored(SubscriptionStatus::Cancelled)),
            )
            .await
    }
}
