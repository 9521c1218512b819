//! Storage error type
//!
//! Every round trip failure leaves the db layer as one `DataAccessError`
//! carrying the logical operation name and the original cause.

use std::borrow::Cow;

use thiserror::Error;

/// What actually went wrong underneath a [`DataAccessError`].
#[derive(Debug, Error)]
pub enum StoreCause {
    /// Driver-level failure: connectivity, constraint, timeout, row decode.
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    /// SQL references `@name` but no parameter `name` was supplied.
    #[error("no value bound for placeholder @{0}")]
    UnboundParameter(String),

    /// A parameter was supplied that the SQL never references.
    #[error("parameter '{0}' is not referenced by the statement")]
    UnusedParameter(String),
}

/// Uniform storage failure surfaced to services.
#[derive(Debug, Error)]
#[error("data access failed in {operation}: {cause}")]
pub struct DataAccessError {
    pub operation: Cow<'static, str>,
    #[source]
    pub cause: StoreCause,
}

impl DataAccessError {
    pub fn new(operation: impl Into<Cow<'static, str>>, cause: impl Into<StoreCause>) -> Self {
        Self {
            operation: operation.into(),
            cause: cause.into(),
        }
    }

    /// The wrapped driver error, if the failure came from the driver.
    pub fn driver_error(&self) -> Option<&sqlx::Error> {
        match &self.cause {
            StoreCause::Driver(e) => Some(e),
            _ => None,
        }
    }

    /// Unique or primary key constraint violated.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.database_error_kind(),
            Some(sqlx::error::ErrorKind::UniqueViolation)
        )
    }

    /// Foreign key constraint violated (missing parent or dependent children).
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self.database_error_kind(),
            Some(sqlx::error::ErrorKind::ForeignKeyViolation)
        )
    }

    /// Pool could not hand out a connection in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self.driver_error(), Some(sqlx::Error::PoolTimedOut))
    }

    fn database_error_kind(&self) -> Option<sqlx::error::ErrorKind> {
        match self.driver_error()? {
            sqlx::Error::Database(db) => Some(db.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_operation_and_cause() {
        let err = DataAccessError::new(
            "vehicles.get",
            StoreCause::UnboundParameter("plate".into()),
        );
        assert_eq!(
            err.to_string(),
            "data access failed in vehicles.get: no value bound for placeholder @plate"
        );
    }

    #[test]
    fn wraps_driver_errors() {
        let err = DataAccessError::new("vehicles.count", sqlx::Error::PoolTimedOut);
        assert!(err.is_timeout());
        assert!(!err.is_unique_violation());
        assert!(err.driver_error().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }
}
