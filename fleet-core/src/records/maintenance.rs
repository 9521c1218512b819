//! Maintenance records and maintenance applications

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{require_non_negative, require_ordered_dates, require_text, MAX_TEXT_LEN};
use crate::{ApplicationStatus, MaintenanceKind, MaintenanceStatus, ValidationError};

/// Row of `maintenance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    #[serde(default)]
    pub id: Option<i64>,
    pub vehicle_id: i64,
    pub kind: MaintenanceKind,
    pub description: String,
    #[serde(default)]
    pub cost: f64,
    pub scheduled_on: NaiveDate,
    #[serde(default)]
    pub completed_on: Option<NaiveDate>,
    #[serde(default)]
    pub status: MaintenanceStatus,
}

impl Maintenance {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description, MAX_TEXT_LEN)?;
        require_non_negative("cost", self.cost)?;
        require_ordered_dates("maintenance", self.scheduled_on, self.completed_on)
    }
}

/// Row of `maintenanceapplications`: a request for maintenance on a vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceApplication {
    #[serde(default)]
    pub id: Option<i64>,
    pub vehicle_id: i64,
    /// User who filed the request
    pub requested_by: i64,
    pub description: String,
    #[serde(default)]
    pub submitted_on: NaiveDate,
    #[serde(default)]
    pub status: ApplicationStatus,
    /// Maintenance record created on approval
    #[serde(default)]
    pub maintenance_id: Option<i64>,
}

impl MaintenanceApplication {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description, MAX_TEXT_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_cannot_precede_schedule() {
        let record = Maintenance {
            id: None,
            vehicle_id: 1,
            kind: MaintenanceKind::Corrective,
            description: "Replace brake pads".into(),
            cost: 120.0,
            scheduled_on: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            completed_on: NaiveDate::from_ymd_opt(2025, 2, 9),
            status: MaintenanceStatus::Completed,
        };
        assert!(matches!(
            record.validate().unwrap_err(),
            ValidationError::InvertedRange { .. }
        ));
    }
}
