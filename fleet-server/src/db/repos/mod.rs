//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Wraps a generic `Table` and is built per call on a session:
//!   `VehicleRepo::new(executor.clone())` or `VehicleRepo::new(&mut uow)`
//! - A missing row is `Ok(None)` / `Ok(false)`; failures propagate
//! - Guarded single-statement updates instead of read-modify-write

pub mod buses;
pub mod drivers;
pub mod inventory;
pub mod maintenance;
pub mod missions;
pub mod orders;
pub mod patrols;
pub mod users;
pub mod vacations;
pub mod vehicles;

pub use buses::BusRepo;
pub use drivers::DriverRepo;
pub use inventory::{ConsumableRepo, SparePartRepo};
pub use maintenance::{MaintenanceApplicationRepo, MaintenanceRepo};
pub use missions::MissionRepo;
pub use orders::{ApplicationRepo, JobOrderRepo};
pub use patrols::{PatrolRepo, SubscriptionRepo};
pub use users::UserRepo;
pub use vacations::VacationRepo;
pub use vehicles::VehicleRepo;
