//! Missions, their notes and their link rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{require_ordered_dates, require_text, MAX_TEXT_LEN};
use crate::{MissionStatus, ValidationError};

const MAX_TITLE_LEN: usize = 256;

/// Row of `missions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub destination: String,
    #[serde(default)]
    pub driver_id: Option<i64>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: MissionStatus,
}

impl Mission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE_LEN)?;
        require_text("destination", &self.destination, MAX_TITLE_LEN)?;
        require_ordered_dates("mission", self.start_date, self.end_date)
    }
}

/// Row of `missionsnotes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionNote {
    #[serde(default)]
    pub id: Option<i64>,
    pub mission_id: i64,
    pub author_id: i64,
    pub note: String,
    #[serde(default)]
    pub written_on: NaiveDate,
}

impl MissionNote {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("note", &self.note, MAX_TEXT_LEN)
    }
}

/// Row of `missionsvehicles`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionVehicle {
    pub mission_id: i64,
    pub vehicle_id: i64,
}

/// Row of `missionsjoborders`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionJobOrder {
    pub mission_id: i64,
    pub job_order_id: i64,
}
