//! Query executor
//!
//! One generic operation: compile a `BoundQuery`, run it on one connection,
//! pass the raw output to a caller-supplied transform and return the result.
//! The connection is scoped to the call and goes back to the pool on every
//! exit path, including a failing transform. All failures come back as a
//! single `DataAccessError` naming the operation.
//!
//! The executor never opens a transaction. Callers that need atomicity
//! across statements use a [`UnitOfWork`], which offers the same API on one
//! transaction-bound connection.

use std::borrow::Cow;
use std::future::Future;
use std::time::Instant;

use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, Transaction};
use tracing::debug;

use super::query::{BoundQuery, CompiledQuery, QueryKind, QueryOutput, SqlValue};
use super::{ConnectionProvider, DataAccessError, Dialect, StoreCause};

/// Something queries can be run against: the pool or an open transaction.
pub trait Session: Send {
    /// SQL dialect of the connections behind this session.
    fn dialect(&self) -> Dialect;

    /// Run one bound query and hand its raw output to `transform`.
    fn execute_query<T, F>(
        &mut self,
        operation: impl Into<Cow<'static, str>> + Send,
        query: BoundQuery,
        transform: F,
    ) -> impl Future<Output = Result<T, DataAccessError>> + Send
    where
        T: Send,
        F: FnOnce(QueryOutput) -> Result<T, sqlx::Error> + Send;
}

impl<S: Session> Session for &mut S {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn execute_query<T, F>(
        &mut self,
        operation: impl Into<Cow<'static, str>> + Send,
        query: BoundQuery,
        transform: F,
    ) -> impl Future<Output = Result<T, DataAccessError>> + Send
    where
        T: Send,
        F: FnOnce(QueryOutput) -> Result<T, sqlx::Error> + Send,
    {
        (**self).execute_query(operation, query, transform)
    }
}

/// Runs bound queries on pooled connections.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    provider: ConnectionProvider,
}

impl QueryExecutor {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    pub fn dialect(&self) -> Dialect {
        self.provider.dialect()
    }

    /// Run `query` on a fresh connection and adapt its output.
    ///
    /// # Errors
    ///
    /// Binding, connection, driver and transform failures all return
    /// `DataAccessError` with the original cause.
    pub async fn run<T, F>(
        &self,
        operation: impl Into<Cow<'static, str>>,
        query: BoundQuery,
        transform: F,
    ) -> Result<T, DataAccessError>
    where
        F: FnOnce(QueryOutput) -> Result<T, sqlx::Error>,
    {
        let operation = operation.into();
        let started = Instant::now();

        let compiled = query
            .compile()
            .map_err(|cause| DataAccessError::new(operation.clone(), cause))?;

        let result = async {
            let mut conn = self.provider.acquire().await?;
            let output = round_trip(&mut *conn, compiled).await;
            // Back in the pool before the transform runs; it only sees
            // buffered output.
            drop(conn);
            let output = output?;
            transform(output).map_err(StoreCause::from)
        }
        .await;

        debug!(
            operation = %operation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "round trip"
        );

        result.map_err(|cause| DataAccessError::new(operation, cause))
    }

    /// Open a transaction for a multi-statement operation.
    pub async fn begin(&self) -> Result<UnitOfWork, DataAccessError> {
        let tx = self
            .provider
            .begin()
            .await
            .map_err(|e| DataAccessError::new("begin", e))?;
        Ok(UnitOfWork {
            tx,
            dialect: self.dialect(),
        })
    }
}

impl Session for QueryExecutor {
    fn dialect(&self) -> Dialect {
        self.provider.dialect()
    }

    fn execute_query<T, F>(
        &mut self,
        operation: impl Into<Cow<'static, str>> + Send,
        query: BoundQuery,
        transform: F,
    ) -> impl Future<Output = Result<T, DataAccessError>> + Send
    where
        T: Send,
        F: FnOnce(QueryOutput) -> Result<T, sqlx::Error> + Send,
    {
        self.run(operation, query, transform)
    }
}

/// An explicit transaction. Dropped without `commit`, it rolls back.
pub struct UnitOfWork {
    tx: Transaction<'static, Any>,
    dialect: Dialect,
}

impl UnitOfWork {
    /// Run `query` inside the transaction.
    pub async fn run<T, F>(
        &mut self,
        operation: impl Into<Cow<'static, str>>,
        query: BoundQuery,
        transform: F,
    ) -> Result<T, DataAccessError>
    where
        F: FnOnce(QueryOutput) -> Result<T, sqlx::Error>,
    {
        let operation = operation.into();
        let started = Instant::now();

        let compiled = query
            .compile()
            .map_err(|cause| DataAccessError::new(operation.clone(), cause))?;

        let result = match round_trip(&mut *self.tx, compiled).await {
            Ok(output) => transform(output).map_err(StoreCause::from),
            Err(e) => Err(StoreCause::from(e)),
        };

        debug!(
            operation = %operation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "round trip (transaction)"
        );

        result.map_err(|cause| DataAccessError::new(operation, cause))
    }

    pub async fn commit(self) -> Result<(), DataAccessError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DataAccessError::new("commit", e))
    }

    pub async fn rollback(self) -> Result<(), DataAccessError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DataAccessError::new("rollback", e))
    }
}

impl Session for UnitOfWork {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn execute_query<T, F>(
        &mut self,
        operation: impl Into<Cow<'static, str>> + Send,
        query: BoundQuery,
        transform: F,
    ) -> impl Future<Output = Result<T, DataAccessError>> + Send
    where
        T: Send,
        F: FnOnce(QueryOutput) -> Result<T, sqlx::Error> + Send,
    {
        self.run(operation, query, transform)
    }
}

/// One execution of a compiled statement on one connection.
async fn round_trip(
    conn: &mut AnyConnection,
    compiled: CompiledQuery,
) -> Result<QueryOutput, sqlx::Error> {
    let CompiledQuery { sql, values, kind } = compiled;

    let mut query = sqlx::query(&sql);
    for value in values {
        query = bind_value(query, value);
    }

    match kind {
        QueryKind::Rows => Ok(QueryOutput::Rows(query.fetch_all(conn).await?)),
        QueryKind::Command => {
            let done = query.execute(conn).await?;
            Ok(QueryOutput::Done {
                rows_affected: done.rows_affected(),
                last_insert_id: done.last_insert_id(),
            })
        }
    }
}

fn bind_value<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: SqlValue,
) -> Query<'q, Any, AnyArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Int(v) => query.bind(v),
        SqlValue::Float(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::ConnectionSettings;
    use sqlx::Row;

    // One connection and a short acquire timeout: a leaked handle makes the
    // next call fail with PoolTimedOut instead of waiting.
    fn executor() -> QueryExecutor {
        let settings = ConnectionSettings {
            acquire_timeout: Duration::from_millis(500),
            ..ConnectionSettings::in_memory()
        };
        QueryExecutor::new(ConnectionProvider::new(settings).unwrap())
    }

    async fn create_items(executor: &QueryExecutor) {
        executor
            .run(
                "create items",
                BoundQuery::command(
                    "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name VARCHAR(16) NOT NULL UNIQUE)",
                ),
                |_| Ok(()),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failing_transform_releases_connection() {
        let executor = executor();

        for _ in 0..3 {
            let err = executor
                .run("select one", BoundQuery::rows("SELECT 1"), |_| {
                    Err::<(), _>(sqlx::Error::RowNotFound)
                })
                .await
                .unwrap_err();
            assert_eq!(err.operation, "select one");
            assert!(matches!(
                err.cause,
                StoreCause::Driver(sqlx::Error::RowNotFound)
            ));
        }

        let one = executor
            .run("select one", BoundQuery::rows("SELECT 1"), |out| {
                out.into_first()
                    .ok_or(sqlx::Error::RowNotFound)?
                    .try_get::<i64, _>(0)
            })
            .await
            .expect("connection should be back in the pool");
        assert_eq!(one, 1);
        assert_eq!(executor.provider().open_connections(), 1);
    }

    #[tokio::test]
    async fn driver_failure_is_data_access_error() {
        let executor = executor();
        let err = executor
            .run("broken", BoundQuery::rows("SELECT * FROM missing_table"), |_| Ok(()))
            .await
            .unwrap_err();
        assert_eq!(err.operation, "broken");
        assert!(err.driver_error().is_some());

        // Still usable afterwards.
        executor
            .run("select one", BoundQuery::rows("SELECT 1"), |_| Ok(()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn binding_error_takes_no_connection() {
        let executor = executor();
        let err = executor
            .run(
                "unbound",
                BoundQuery::rows("SELECT * FROM items WHERE id = @id"),
                |_| Ok(()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.cause, StoreCause::UnboundParameter(_)));
        assert_eq!(executor.provider().open_connections(), 0);
    }

    #[tokio::test]
    async fn insert_returns_generated_key_and_unique_violation() {
        let executor = executor();
        create_items(&executor).await;

        let insert = |name: &'static str| {
            BoundQuery::rows("INSERT INTO items (name) VALUES (@name) RETURNING id")
                .bind("name", name)
        };
        let key = |out: QueryOutput| {
            out.into_first()
                .ok_or(sqlx::Error::RowNotFound)?
                .try_get::<i64, _>(0)
        };

        let first = executor.run("insert", insert("a"), key).await.unwrap();
        let second = executor.run("insert", insert("b"), key).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let err = executor
            .run("insert", insert("a"), |_| Ok(()))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let executor = executor();
        create_items(&executor).await;

        {
            let mut uow = executor.begin().await.unwrap();
            uow.run(
                "insert",
                BoundQuery::command("INSERT INTO items (name) VALUES (@name)").bind("name", "x"),
                |_| Ok(()),
            )
            .await
            .unwrap();
        }

        let count = executor
            .run("count", BoundQuery::rows("SELECT COUNT(*) FROM items"), |out| {
                out.into_first()
                    .ok_or(sqlx::Error::RowNotFound)?
                    .try_get::<i64, _>(0)
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn committed_unit_of_work_persists() {
        let executor = executor();
        create_items(&executor).await;

        let mut uow = executor.begin().await.unwrap();
        uow.run(
            "insert",
            BoundQuery::command("INSERT INTO items (name) VALUES (@name)").bind("name", "y"),
            |_| Ok(()),
        )
        .await
        .unwrap();
        uow.commit().await.unwrap();

        let rows = executor
            .run("select", BoundQuery::rows("SELECT name FROM items"), |out| {
                Ok(out.into_rows().len())
            })
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
