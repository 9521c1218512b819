//! Users, drivers and driver vacations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{
    optional_text, require_ordered_dates, require_text, Username, MAX_TEXT_LEN,
};
use crate::{DriverStatus, UserRole, ValidationError, VacationStatus};

const MAX_NAME_LEN: usize = 128;
const MAX_CONTACT_LEN: usize = 64;

/// Row of `users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub created_on: NaiveDate,
}

impl User {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Username::new(&self.username)?;
        require_text("full name", &self.full_name, MAX_NAME_LEN)?;
        optional_text("phone", self.phone.as_deref(), MAX_CONTACT_LEN)?;
        if let Some(email) = &self.email {
            require_text("email", email, MAX_NAME_LEN)?;
            if !email.contains('@') {
                return Err(ValidationError::InvalidFormat {
                    field: "email",
                    reason: "must contain '@'",
                });
            }
        }
        Ok(())
    }
}

/// Row of `drivers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(default)]
    pub id: Option<i64>,
    pub full_name: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: DriverStatus,
    /// Vehicle currently assigned to the driver
    #[serde(default)]
    pub vehicle_id: Option<i64>,
}

impl Driver {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("full name", &self.full_name, MAX_NAME_LEN)?;
        require_text("license number", &self.license_number, MAX_CONTACT_LEN)?;
        optional_text("phone", self.phone.as_deref(), MAX_CONTACT_LEN)
    }

    /// Whether the license is still valid on `day`.
    pub fn licensed_on(&self, day: NaiveDate) -> bool {
        self.license_expiry >= day
    }
}

/// Row of `vacations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacation {
    #[serde(default)]
    pub id: Option<i64>,
    pub driver_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: VacationStatus,
}

impl Vacation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_ordered_dates("vacation", self.start_date, Some(self.end_date))?;
        optional_text("reason", self.reason.as_deref(), MAX_TEXT_LEN)
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}
