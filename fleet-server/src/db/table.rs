//! Generic table access
//!
//! `Table<R, S>` builds the SQL for the standard operations from a record's
//! metadata and runs it on a session (the pool or an open transaction).
//! Per-entity repositories wrap one and add their own lookups.
//!
//! Absence is never an error here: a missing key is `None`, an empty match
//! is an empty vector, an update or delete that touched nothing is `false`.

use std::marker::PhantomData;

use fleet_core::{Page, Paginated};
use sqlx::Row;

use super::record::{key_column, Filter, Keyed, Record};
use super::{BoundQuery, DataAccessError, QueryOutput, Session};

pub struct Table<R, S> {
    session: S,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, S: Session> Table<R, S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            _record: PhantomData,
        }
    }

    /// The underlying session, for composing other repositories on it.
    pub fn session(&mut self) -> &mut S {
        &mut self.session
    }

    /// Rows matching `filter`, ordered by `order_by`, optionally one page.
    pub async fn find(
        &mut self,
        filter: Filter,
        order_by: &str,
        page: Option<Page>,
    ) -> Result<Vec<R>, DataAccessError> {
        let mut sql = format!(
            "SELECT {} FROM {}{} ORDER BY {}",
            R::projection(),
            R::TABLE,
            filter.where_sql(),
            order_by
        );
        if page.is_some() {
            sql.push_str(" LIMIT @limit OFFSET @offset");
        }

        let mut query = BoundQuery::rows(sql).bind_all(filter.into_params());
        if let Some(page) = page {
            query = query
                .bind("limit", page.limit())
                .bind("offset", page.offset());
        }

        self.session
            .execute_query(format!("{}.find", R::TABLE), query, |out| {
                out.into_rows().iter().map(R::from_row).collect()
            })
            .await
    }

    /// First row matching `filter`.
    pub async fn find_one(&mut self, filter: Filter) -> Result<Option<R>, DataAccessError> {
        let sql = format!(
            "SELECT {} FROM {}{} LIMIT 1",
            R::projection(),
            R::TABLE,
            filter.where_sql()
        );
        let query = BoundQuery::rows(sql).bind_all(filter.into_params());

        self.session
            .execute_query(format!("{}.find_one", R::TABLE), query, |out| {
                out.into_first().as_ref().map(R::from_row).transpose()
            })
            .await
    }

    /// Whether any row matches.
    pub async fn exists(&mut self, filter: Filter) -> Result<bool, DataAccessError> {
        let sql = format!("SELECT 1 FROM {}{} LIMIT 1", R::TABLE, filter.where_sql());
        let query = BoundQuery::rows(sql).bind_all(filter.into_params());

        self.session
            .execute_query(format!("{}.exists", R::TABLE), query, |out| {
                Ok(out.into_first().is_some())
            })
            .await
    }

    /// Number of rows matching `filter`.
    pub async fn count(&mut self, filter: Filter) -> Result<i64, DataAccessError> {
        let sql = format!("SELECT COUNT(*) FROM {}{}", R::TABLE, filter.where_sql());
        let query = BoundQuery::rows(sql).bind_all(filter.into_params());

        self.session
            .execute_query(format!("{}.count", R::TABLE), query, |out| {
                match out.into_first() {
                    Some(row) => row.try_get::<i64, _>(0),
                    None => Ok(0),
                }
            })
            .await
    }

    /// Insert `record`, returning the generated key if the driver reported one.
    ///
    /// Still one round trip: the key comes from the completion on MySQL and
    /// from a `RETURNING` row on SQLite.
    pub async fn insert(&mut self, record: &R) -> Result<Option<i64>, DataAccessError> {
        let placeholders = R::COLUMNS
            .iter()
            .map(|c| format!("@{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders
        );
        let query = match R::KEY.and_then(|key| self.session.dialect().returning_key(key)) {
            Some(returning) => {
                sql.push_str(&returning);
                BoundQuery::rows(sql)
            }
            None => BoundQuery::command(sql),
        }
        .bind_all(R::COLUMNS.iter().copied().zip(record.values()));

        self.session
            .execute_query(format!("{}.insert", R::TABLE), query, |out| match out {
                QueryOutput::Rows(rows) => rows
                    .first()
                    .map(|row| row.try_get::<i64, _>(0))
                    .transpose(),
                done => Ok(done.last_insert_id()),
            })
            .await
    }

    /// Overwrite every data column of the matching rows with `record`.
    ///
    /// Filter parameters share the namespace of the column placeholders, so
    /// they must not be named after a column (`@plate`, not `@plate_numbers`).
    pub async fn update_matching(
        &mut self,
        record: &R,
        filter: Filter,
    ) -> Result<bool, DataAccessError> {
        let assignments = R::COLUMNS
            .iter()
            .map(|c| format!("{c} = @{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {} SET {}{}", R::TABLE, assignments, filter.where_sql());
        let query = BoundQuery::command(sql)
            .bind_all(R::COLUMNS.iter().copied().zip(record.values()))
            .bind_all(filter.into_params());

        self.session
            .execute_query(format!("{}.update", R::TABLE), query, |out| {
                Ok(out.rows_affected() > 0)
            })
            .await
    }

    /// Apply `assignments` (e.g. `status = @status`) to matching rows.
    /// Values for both the assignments and the filter travel in `filter`.
    pub async fn update_where(
        &mut self,
        assignments: &str,
        filter: Filter,
    ) -> Result<bool, DataAccessError> {
        let sql = format!(
            "UPDATE {} SET {}{}",
            R::TABLE,
            assignments,
            filter.where_sql()
        );
        let query = BoundQuery::command(sql).bind_all(filter.into_params());

        self.session
            .execute_query(format!("{}.update_where", R::TABLE), query, |out| {
                Ok(out.rows_affected() > 0)
            })
            .await
    }

    /// Delete matching rows; `true` if any were removed.
    pub async fn delete_where(&mut self, filter: Filter) -> Result<bool, DataAccessError> {
        let sql = format!("DELETE FROM {}{}", R::TABLE, filter.where_sql());
        let query = BoundQuery::command(sql).bind_all(filter.into_params());

        self.session
            .execute_query(format!("{}.delete_where", R::TABLE), query, |out| {
                Ok(out.rows_affected() > 0)
            })
            .await
    }
}

impl<R: Keyed, S: Session> Table<R, S> {
    /// Lookup by surrogate key.
    pub async fn get(&mut self, key: i64) -> Result<Option<R>, DataAccessError> {
        self.find_one(Filter::eq(key_column::<R>(), key)).await
    }

    /// Overwrite every data column of row `key` with `record`.
    pub async fn update(&mut self, key: i64, record: &R) -> Result<bool, DataAccessError> {
        self.update_matching(record, Filter::eq(key_column::<R>(), key))
            .await
    }

    pub async fn delete(&mut self, key: i64) -> Result<bool, DataAccessError> {
        self.delete_where(Filter::eq(key_column::<R>(), key)).await
    }

    /// One page of matching rows, ordered by key, with the total count.
    pub async fn page(&mut self, filter: Filter, page: Page) -> Result<Paginated<R>, DataAccessError> {
        let total = self.count(filter.clone()).await?;
        let items = self.find(filter, key_column::<R>(), Some(page)).await?;
        Ok(Paginated::new(items, total, page))
    }
}
