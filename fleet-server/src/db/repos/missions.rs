//! Missions, their notes and the vehicles and job orders attached to them

use fleet_core::{
    JobOrder, Mission, MissionJobOrder, MissionNote, MissionStatus, MissionVehicle, Page,
    Paginated, Vehicle,
};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::record::{get_date, get_enum, get_opt_date};
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Mission {
    const TABLE: &'static str = "missions";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "destination",
        "driver_id",
        "start_date",
        "end_date",
        "status",
    ];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            destination: row.try_get("destination")?,
            driver_id: row.try_get("driver_id")?,
            start_date: get_date(row, "start_date")?,
            end_date: get_opt_date(row, "end_date")?,
            status: get_enum(row, "status")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(&self.title),
            SqlValue::from(&self.destination),
            SqlValue::from(self.driver_id),
            SqlValue::from(self.start_date),
            SqlValue::from(self.end_date),
            SqlValue::stored(self.status),
        ]
    }
}

impl Keyed for Mission {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

impl Record for MissionNote {
    const TABLE: &'static str = "missionsnotes";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &["mission_id", "author_id", "note", "written_on"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            mission_id: row.try_get("mission_id")?,
            author_id: row.try_get("author_id")?,
            note: row.try_get("note")?,
            written_on: get_date(row, "written_on")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.mission_id),
            SqlValue::from(self.author_id),
            SqlValue::from(&self.note),
            SqlValue::from(self.written_on),
        ]
    }
}

impl Keyed for MissionNote {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

impl Record for MissionVehicle {
    const TABLE: &'static str = "missionsvehicles";
    const KEY: Option<&'static str> = None;
    const COLUMNS: &'static [&'static str] = &["mission_id", "vehicle_id"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            mission_id: row.try_get("mission_id")?,
            vehicle_id: row.try_get("vehicle_id")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![SqlValue::from(self.mission_id), SqlValue::from(self.vehicle_id)]
    }
}

impl Record for MissionJobOrder {
    const TABLE: &'static str = "missionsjoborders";
    const KEY: Option<&'static str> = None;
    const COLUMNS: &'static [&'static str] = &["mission_id", "job_order_id"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            mission_id: row.try_get("mission_id")?,
            job_order_id: row.try_get("job_order_id")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.mission_id),
            SqlValue::from(self.job_order_id),
        ]
    }
}

/// Mission repository, including notes and attachments.
pub struct MissionRepo<S> {
    table: Table<Mission, S>,
}

impl<S: Session> MissionRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    fn related<R: Record>(&mut self) -> Table<R, &mut S> {
        Table::new(self.table.session())
    }

    pub async fn create(&mut self, mission: &Mission) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(mission).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Mission>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Mission>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_by_status(
        &mut self,
        status: MissionStatus,
    ) -> Result<Vec<Mission>, DataAccessError> {
        self.table
            .find(Filter::eq("status", SqlValue::stored(status)), "start_date, id", None)
            .await
    }

    pub async fn list_for_driver(&mut self, driver_id: i64) -> Result<Vec<Mission>, DataAccessError> {
        self.table
            .find(
                Filter::eq("driver_id", driver_id),
                "start_date DESC, id DESC",
                None,
            )
            .await
    }

    pub async fn update(&mut self, id: i64, mission: &Mission) -> Result<bool, DataAccessError> {
        self.table.update(id, mission).await
    }

    pub async fn update_status(
        &mut self,
        id: i64,
        status: MissionStatus,
    ) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "status = @status",
                Filter::eq("id", id).param("status", SqlValue::stored(status)),
            )
            .await
    }

    pub async fn assign_driver(&mut self, id: i64, driver_id: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where(
                "driver_id = @driver_id",
                Filter::eq("id", id).param("driver_id", driver_id),
            )
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }

    // Notes

    pub async fn add_note(&mut self, note: &MissionNote) -> Result<Option<i64>, DataAccessError> {
        self.related::<MissionNote>().insert(note).await
    }

    pub async fn list_notes(&mut self, mission_id: i64) -> Result<Vec<MissionNote>, DataAccessError> {
        self.related::<MissionNote>()
            .find(Filter::eq("mission_id", mission_id), "written_on, id", None)
            .await
    }

    // Vehicles

    pub async fn attach_vehicle(
        &mut self,
        mission_id: i64,
        vehicle_id: i64,
    ) -> Result<(), DataAccessError> {
        self.related::<MissionVehicle>()
            .insert(&MissionVehicle {
                mission_id,
                vehicle_id,
            })
            .await
            .map(|_| ())
    }

    pub async fn detach_vehicle(
        &mut self,
        mission_id: i64,
        vehicle_id: i64,
    ) -> Result<bool, DataAccessError> {
        self.related::<MissionVehicle>()
            .delete_where(Filter::eq("mission_id", mission_id).and_eq("vehicle_id", vehicle_id))
            .await
    }

    pub async fn is_vehicle_attached(
        &mut self,
        mission_id: i64,
        vehicle_id: i64,
    ) -> Result<bool, DataAccessError> {
        self.related::<MissionVehicle>()
            .exists(Filter::eq("mission_id", mission_id).and_eq("vehicle_id", vehicle_id))
            .await
    }

    pub async fn list_vehicles(&mut self, mission_id: i64) -> Result<Vec<Vehicle>, DataAccessError> {
        self.related::<Vehicle>()
            .find(
                Filter::raw(
                    "id IN (SELECT vehicle_id FROM missionsvehicles WHERE mission_id = @mission_id)",
                )
                .param("mission_id", mission_id),
                "plate_numbers",
                None,
            )
            .await
    }

    // Job orders

    pub async fn attach_job_order(
        &mut self,
        mission_id: i64,
        job_order_id: i64,
    ) -> Result<(), DataAccessError> {
        self.related::<MissionJobOrder>()
            .insert(&MissionJobOrder {
                mission_id,
                job_order_id,
            })
            .await
            .map(|_| ())
    }

    pub async fn list_job_orders(&mut self, mission_id: i64) -> Result<Vec<JobOrder>, DataAccessError> {
        self.related::<JobOrder>()
            .find(
                Filter::raw(
                    "id IN (SELECT job_order_id FROM missionsjoborders WHERE mission_id = @mission_id)",
                )
                .param("mission_id", mission_id),
                "id",
                None,
            )
            .await
    }
}
