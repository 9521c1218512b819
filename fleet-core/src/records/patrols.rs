//! Employee patrols (scheduled bus runs) and their subscriptions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{require_clock_time, require_text};
use crate::{PatrolStatus, SubscriptionStatus, ValidationError};

const MAX_NAME_LEN: usize = 128;
const MAX_ROUTE_LEN: usize = 512;

/// Row of `patrols`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patrol {
    #[serde(default)]
    pub id: Option<i64>,
    pub bus_id: i64,
    pub name: String,
    pub route: String,
    /// "HH:MM"
    pub departure_time: String,
    #[serde(default)]
    pub status: PatrolStatus,
}

impl Patrol {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, MAX_NAME_LEN)?;
        require_text("route", &self.route, MAX_ROUTE_LEN)?;
        require_clock_time("departure time", &self.departure_time)
    }
}

/// Row of `patrolssubscriptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolSubscription {
    #[serde(default)]
    pub id: Option<i64>,
    pub patrol_id: i64,
    pub employee_id: i64,
    #[serde(default)]
    pub subscribed_on: NaiveDate,
    #[serde(default)]
    pub status: SubscriptionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departure_time_format() {
        let mut patrol = Patrol {
            id: None,
            bus_id: 1,
            name: "Morning north loop".into(),
            route: "Depot - North Gate - Plant 2".into(),
            departure_time: "06:45".into(),
            status: PatrolStatus::Active,
        };
        assert!(patrol.validate().is_ok());

        patrol.departure_time = "6:45am".into();
        assert!(patrol.validate().is_err());
    }
}
