//! Plain records, one per table
//!
//! Surrogate keys are `None` before insertion. Records carry no behaviour
//! beyond `validate`, which performs the argument checks a service runs
//! before writing.

pub mod fleet;
pub mod inventory;
pub mod maintenance;
pub mod missions;
pub mod orders;
pub mod patrols;
pub mod staff;

pub use fleet::{Bus, Vehicle};
pub use inventory::{Consumable, SparePart};
pub use maintenance::{Maintenance, MaintenanceApplication};
pub use missions::{Mission, MissionJobOrder, MissionNote, MissionVehicle};
pub use orders::{Application, JobOrder};
pub use patrols::{Patrol, PatrolSubscription};
pub use staff::{Driver, User, Vacation};
