//! Applications and the job orders raised from them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{require_ordered_dates, require_text, MAX_TEXT_LEN};
use crate::{ApplicationKind, ApplicationStatus, JobOrderStatus, ValidationError};

const MAX_TITLE_LEN: usize = 256;

/// Row of `applications`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub id: Option<i64>,
    pub applicant_id: i64,
    #[serde(default)]
    pub vehicle_id: Option<i64>,
    pub kind: ApplicationKind,
    pub description: String,
    #[serde(default)]
    pub submitted_on: NaiveDate,
    #[serde(default)]
    pub status: ApplicationStatus,
}

impl Application {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description, MAX_TEXT_LEN)
    }
}

/// Row of `joborders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOrder {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub application_id: Option<i64>,
    #[serde(default)]
    pub vehicle_id: Option<i64>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub opened_on: NaiveDate,
    #[serde(default)]
    pub closed_on: Option<NaiveDate>,
    #[serde(default)]
    pub status: JobOrderStatus,
}

impl JobOrder {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE_LEN)?;
        require_text("description", &self.description, MAX_TEXT_LEN)?;
        require_ordered_dates("job order", self.opened_on, self.closed_on)
    }

    /// Job order raised for an approved application.
    pub fn for_application(application: &Application, application_id: i64, today: NaiveDate) -> Self {
        let title = format!("{} request #{}", application.kind, application_id);
        Self {
            id: None,
            application_id: Some(application_id),
            vehicle_id: application.vehicle_id,
            title,
            description: application.description.clone(),
            opened_on: today,
            closed_on: None,
            status: JobOrderStatus::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_order_from_application() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let application = Application {
            id: Some(7),
            applicant_id: 3,
            vehicle_id: Some(11),
            kind: ApplicationKind::Repair,
            description: "Headlight out".into(),
            submitted_on: today,
            status: ApplicationStatus::Approved,
        };

        let order = JobOrder::for_application(&application, 7, today);
        assert_eq!(order.title, "Repair request #7");
        assert_eq!(order.application_id, Some(7));
        assert_eq!(order.vehicle_id, Some(11));
        assert_eq!(order.status, JobOrderStatus::Open);
        assert!(order.validate().is_ok());
    }
}
