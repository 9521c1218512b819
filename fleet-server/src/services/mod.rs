//! Service layer - shallow validation and orchestration over repositories
//!
//! Services own a `QueryExecutor` handle (cheap to clone) and build
//! repositories per call. Operations that write to more than one table open a
//! `UnitOfWork` and commit only after every step succeeded; an early return
//! drops the transaction, which rolls it back.

pub mod applications;
pub mod fleet;
pub mod inventory;
pub mod maintenance;
pub mod missions;
pub mod patrols;
pub mod staff;

use chrono::NaiveDate;
use fleet_core::ValidationError;
use thiserror::Error;
use tracing::warn;

use crate::db::DataAccessError;

pub use applications::ApplicationService;
pub use fleet::{BusDetails, BusService, NewBus, VehicleService};
pub use inventory::{InventoryService, LowStockReport};
pub use maintenance::{MaintenanceService, MaintenanceTerms};
pub use missions::MissionService;
pub use patrols::PatrolService;
pub use staff::{DriverService, UserService, VacationService};

/// Why a service operation did not happen.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Data(#[from] DataAccessError),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        let id = id.to_string();
        warn!(resource, id = %id, "Not found");
        Self::NotFound { resource, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(%message, "Conflict");
        Self::Conflict(message)
    }

    /// A failed write: constraint violations become `Conflict` with
    /// `message`, anything else stays a data failure.
    pub fn from_write(err: DataAccessError, message: impl Into<String>) -> Self {
        if err.is_unique_violation() || err.is_foreign_key_violation() {
            Self::conflict(message)
        } else {
            Self::Data(err)
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Generated key of a fresh insert.
pub(crate) fn generated_key(key: Option<i64>, table: &'static str) -> ServiceResult<i64> {
    key.ok_or_else(|| {
        ServiceError::Data(DataAccessError::new(
            format!("{table}.insert"),
            sqlx::Error::Protocol("driver reported no generated key".into()),
        ))
    })
}

/// Current local date, used to stamp new rows.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Quantities moved in or out of stock must be positive.
/// Largest quantity a single restock or withdrawal may move.
pub(crate) const MAX_STOCK_MOVEMENT: i64 = i32::MAX as i64;

pub(crate) fn require_amount(amount: i64) -> Result<(), ValidationError> {
    fleet_core::validation::require_range("amount", amount, 1, MAX_STOCK_MOVEMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_data_error() {
        assert!(matches!(
            generated_key(None, "vehicles"),
            Err(ServiceError::Data(_))
        ));
        assert_eq!(generated_key(Some(7), "vehicles").unwrap(), 7);
    }

    #[test]
    fn not_found_message() {
        let err = ServiceError::not_found("vehicle", "ABC1234");
        assert_eq!(err.to_string(), "vehicle 'ABC1234' not found");
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(require_amount(0).is_err());
        assert!(require_amount(-3).is_err());
        assert!(require_amount(5).is_ok());
        assert!(require_amount(MAX_STOCK_MOVEMENT).is_ok());
        assert!(require_amount(MAX_STOCK_MOVEMENT + 1).is_err());
        assert!(require_amount(i64::MAX).is_err());
    }
}
