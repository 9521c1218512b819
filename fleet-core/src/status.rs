//! Enum-valued columns
//!
//! Every status-like column is stored as the variant name (`"OnMission"`).
//! `StoredEnum::parse` is the single decode path for both API input and
//! stored rows; an unknown value is always rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// An enum persisted as text.
pub trait StoredEnum: Sized + Copy + 'static {
    /// Human-readable column name used in error messages.
    const FIELD: &'static str;

    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// Stored text form.
    fn as_str(&self) -> &'static str;

    /// Decode stored or submitted text. Case-insensitive, never defaults.
    fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: Self::FIELD,
                value: value.to_owned(),
            })
    }
}

macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl StoredEnum for $name {
            const FIELD: &'static str = $field;
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as StoredEnum>::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                <Self as StoredEnum>::parse(&value)
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }
    };
}

stored_enum! {
    /// Account role
    UserRole, "user role" { Admin, Manager, Dispatcher, Driver, Employee }
}

stored_enum! {
    VehicleKind, "vehicle kind" { Car, Bus, Truck, Van, Motorcycle }
}

stored_enum! {
    FuelType, "fuel type" { Petrol, Diesel, Electric, Hybrid, Gas }
}

stored_enum! {
    /// Operational state of a vehicle
    VehicleStatus, "vehicle status" { Available, OnMission, InMaintenance, OutOfService }
}

stored_enum! {
    DriverStatus, "driver status" { Available, OnMission, OnVacation, Inactive }
}

stored_enum! {
    MaintenanceKind, "maintenance kind" { Preventive, Corrective, Inspection }
}

stored_enum! {
    MaintenanceStatus, "maintenance status" { Scheduled, InProgress, Completed, Cancelled }
}

stored_enum! {
    /// Decision state shared by applications and maintenance applications
    ApplicationStatus, "application status" { Pending, Approved, Rejected }
}

stored_enum! {
    ApplicationKind, "application kind" { Repair, Transport, Supply }
}

stored_enum! {
    JobOrderStatus, "job order status" { Open, InProgress, Completed, Cancelled }
}

stored_enum! {
    MissionStatus, "mission status" { Planned, Active, Completed, Cancelled }
}

stored_enum! {
    VacationStatus, "vacation status" { Requested, Approved, Rejected }
}

stored_enum! {
    PatrolStatus, "patrol status" { Active, Suspended }
}

stored_enum! {
    SubscriptionStatus, "subscription status" { Active, Cancelled }
}

// Initial state of a newly created row.
impl Default for VehicleStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl Default for DriverStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl Default for MaintenanceStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for JobOrderStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl Default for MissionStatus {
    fn default() -> Self {
        Self::Planned
    }
}

impl Default for VacationStatus {
    fn default() -> Self {
        Self::Requested
    }
}

impl Default for PatrolStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl MissionStatus {
    /// Completed and cancelled missions accept no further changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl JobOrderStatus {
    /// Allowed forward transitions.
    pub fn can_move_to(&self, next: JobOrderStatus) -> bool {
        use JobOrderStatus::*;
        matches!(
            (self, next),
            (Open, InProgress) | (Open, Cancelled) | (InProgress, Completed) | (InProgress, Cancelled)
        )
    }
}

impl MaintenanceStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Scheduled | Self::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_stored_text() {
        for status in VehicleStatus::VARIANTS {
            assert_eq!(VehicleStatus::parse(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            VehicleStatus::parse("onmission").unwrap(),
            VehicleStatus::OnMission
        );
        assert_eq!(UserRole::parse(" Admin ").unwrap(), UserRole::Admin);
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = DriverStatus::parse("Sleeping").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidVariant {
                field: "driver status",
                value: "Sleeping".into()
            }
        );
    }

    #[test]
    fn serde_uses_stored_text() {
        let json = serde_json::to_string(&MissionStatus::Active).unwrap();
        assert_eq!(json, "\"Active\"");
        let parsed: MissionStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, MissionStatus::Completed);
        assert!(serde_json::from_str::<MissionStatus>("\"Lost\"").is_err());
    }

    #[test]
    fn job_order_transitions() {
        assert!(JobOrderStatus::Open.can_move_to(JobOrderStatus::InProgress));
        assert!(JobOrderStatus::InProgress.can_move_to(JobOrderStatus::Completed));
        assert!(!JobOrderStatus::Completed.can_move_to(JobOrderStatus::Open));
        assert!(!JobOrderStatus::Open.can_move_to(JobOrderStatus::Completed));
    }

    #[test]
    fn terminal_missions() {
        assert!(MissionStatus::Completed.is_terminal());
        assert!(!MissionStatus::Planned.is_terminal());
    }
}
