//! User repository

use fleet_core::{Page, Paginated, User, UserRole};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::{get_date, get_enum};
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for User {
    const TABLE: &'static str = "users";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] =
        &["username", "full_name", "email", "phone", "role", "created_on"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            role: get_enum(row, "role")?,
            created_on: get_date(row, "created_on")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(&self.username),
            SqlValue::from(&self.full_name),
            SqlValue::from(self.email.clone()),
            SqlValue::from(self.phone.clone()),
            SqlValue::stored(self.role),
            SqlValue::from(self.created_on),
        ]
    }
}

impl Keyed for User {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// User repository
pub struct UserRepo<S> {
    table: Table<User, S>,
}

impl<S: Session> UserRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, user: &User) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(user).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<User>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, DataAccessError> {
        self.table.find_one(Filter::eq("username", username)).await
    }

    pub async fn username_exists(&mut self, username: &str) -> Result<bool, DataAccessError> {
        self.table.exists(Filter::eq("username", username)).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<User>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_by_role(&mut self, role: UserRole) -> Result<Vec<User>, DataAccessError> {
        self.table
            .find(Filter::eq("role", SqlValue::stored(role)), "username", None)
            .await
    }

    pub async fn update(&mut self, id: i64, user: &User) -> Result<bool, DataAccessError> {
        self.table.update(id, user).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}
