//! Missions: driver and vehicle assignment, notes and lifecycle
//!
//! Vehicles attached to an active or planned mission are `OnMission`.
//! Completing or cancelling a mission frees its vehicles and driver in the
//! same transaction that records the outcome.

use chrono::NaiveDate;
use fleet_core::{
    DriverStatus, JobOrder, Mission, MissionNote, MissionStatus, Page, Paginated, Vehicle,
    VehicleStatus,
};
use tracing::info;

use super::{generated_key, today, ServiceError, ServiceResult};
use crate::db::{
    DriverRepo, JobOrderRepo, MissionRepo, QueryExecutor, Session, UserRepo, VehicleRepo,
};

#[derive(Debug, Clone)]
pub struct MissionService {
    executor: QueryExecutor,
}

impl MissionService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn repo(&self) -> MissionRepo<QueryExecutor> {
        MissionRepo::new(self.executor.clone())
    }

    /// Plan a mission. A named driver must exist.
    pub async fn create(&self, mission: &Mission) -> ServiceResult<i64> {
        let mission = Mission {
            id: None,
            status: MissionStatus::Planned,
            ..mission.clone()
        };
        mission.validate()?;

        if let Some(driver_id) = mission.driver_id {
            DriverRepo::new(self.executor.clone())
                .get(driver_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("driver", driver_id))?;
        }

        let key = self.repo().create(&mission).await?;
        let id = generated_key(key, "missions")?;
        info!(id, title = %mission.title, "Mission planned");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Mission> {
        self.repo()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("mission", id))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Mission>> {
        Ok(self.repo().list(page).await?)
    }

    pub async fn list_by_status(&self, status: MissionStatus) -> ServiceResult<Vec<Mission>> {
        Ok(self.repo().list_by_status(status).await?)
    }

    pub async fn list_for_driver(&self, driver_id: i64) -> ServiceResult<Vec<Mission>> {
        Ok(self.repo().list_for_driver(driver_id).await?)
    }

    /// Put an available driver on a mission that is not finished. On an
    /// active mission the replaced driver goes back to `Available`.
    pub async fn assign_driver(&self, id: i64, driver_id: i64) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        let mission = open_mission(&mut uow, id).await?;
        let driver = DriverRepo::new(&mut uow)
            .get(driver_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("driver", driver_id))?;
        if driver.status != DriverStatus::Available {
            return Err(ServiceError::conflict(format!(
                "driver {} is {}",
                driver.full_name, driver.status
            )));
        }

        MissionRepo::new(&mut uow).assign_driver(id, driver_id).await?;
        if mission.status == MissionStatus::Active {
            let mut drivers = DriverRepo::new(&mut uow);
            if let Some(previous) = mission.driver_id.filter(|&d| d != driver_id) {
                drivers
                    .update_status(previous, DriverStatus::Available)
                    .await?;
            }
            drivers
                .update_status(driver_id, DriverStatus::OnMission)
                .await?;
        }

        uow.commit().await?;
        info!(mission = id, driver = driver_id, "Driver assigned");
        Ok(())
    }

    /// Attach an available vehicle; it becomes `OnMission`.
    pub async fn attach_vehicle(&self, id: i64, vehicle_id: i64) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        open_mission(&mut uow, id).await?;
        let mut vehicles = VehicleRepo::new(&mut uow);
        let vehicle = vehicles
            .get(vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", vehicle_id))?;
        if vehicle.status != VehicleStatus::Available {
            return Err(ServiceError::conflict(format!(
                "vehicle '{}' is {}",
                vehicle.plate_numbers, vehicle.status
            )));
        }
        vehicles
            .update_status(vehicle_id, VehicleStatus::OnMission)
            .await?;

        MissionRepo::new(&mut uow)
            .attach_vehicle(id, vehicle_id)
            .await
            .map_err(|e| {
                ServiceError::from_write(
                    e,
                    format!("vehicle {vehicle_id} is already attached to mission {id}"),
                )
            })?;

        uow.commit().await?;
        info!(mission = id, plate = %vehicle.plate_numbers, "Vehicle attached");
        Ok(())
    }

    /// Detach a vehicle from a mission that is not finished and make it
    /// available again. Finished missions keep their vehicle history.
    pub async fn detach_vehicle(&self, id: i64, vehicle_id: i64) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        open_mission(&mut uow, id).await?;
        if !MissionRepo::new(&mut uow)
            .detach_vehicle(id, vehicle_id)
            .await?
        {
            return Err(ServiceError::not_found(
                "mission vehicle",
                format!("{id}/{vehicle_id}"),
            ));
        }
        VehicleRepo::new(&mut uow)
            .update_status(vehicle_id, VehicleStatus::Available)
            .await?;

        uow.commit().await?;
        Ok(())
    }

    pub async fn list_vehicles(&self, id: i64) -> ServiceResult<Vec<Vehicle>> {
        self.get(id).await?;
        Ok(self.repo().list_vehicles(id).await?)
    }

    pub async fn attach_job_order(&self, id: i64, job_order_id: i64) -> ServiceResult<()> {
        self.get(id).await?;
        JobOrderRepo::new(self.executor.clone())
            .get(job_order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("job order", job_order_id))?;

        self.repo()
            .attach_job_order(id, job_order_id)
            .await
            .map_err(|e| {
                ServiceError::from_write(
                    e,
                    format!("job order {job_order_id} is already attached to mission {id}"),
                )
            })
    }

    pub async fn list_job_orders(&self, id: i64) -> ServiceResult<Vec<JobOrder>> {
        self.get(id).await?;
        Ok(self.repo().list_job_orders(id).await?)
    }

    /// Add a note stamped with today's date.
    pub async fn add_note(&self, id: i64, author_id: i64, text: &str) -> ServiceResult<i64> {
        let note = MissionNote {
            id: None,
            mission_id: id,
            author_id,
            note: text.to_owned(),
            written_on: today(),
        };
        note.validate()?;

        self.get(id).await?;
        UserRepo::new(self.executor.clone())
            .get(author_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", author_id))?;

        let key = self.repo().add_note(&note).await?;
        generated_key(key, "missionsnotes")
    }

    pub async fn list_notes(&self, id: i64) -> ServiceResult<Vec<MissionNote>> {
        self.get(id).await?;
        Ok(self.repo().list_notes(id).await?)
    }

    /// Planned -> Active. The assigned driver goes `OnMission`.
    pub async fn start(&self, id: i64) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        let mission = open_mission(&mut uow, id).await?;
        if mission.status != MissionStatus::Planned {
            return Err(ServiceError::conflict(format!(
                "mission {id} is already {}",
                mission.status
            )));
        }
        MissionRepo::new(&mut uow)
            .update_status(id, MissionStatus::Active)
            .await?;
        if let Some(driver_id) = mission.driver_id {
            DriverRepo::new(&mut uow)
                .update_status(driver_id, DriverStatus::OnMission)
                .await?;
        }

        uow.commit().await?;
        info!(mission = id, "Mission started");
        Ok(())
    }

    pub async fn complete(&self, id: i64, day: Option<NaiveDate>) -> ServiceResult<()> {
        self.finish(id, MissionStatus::Completed, day.unwrap_or_else(today))
            .await
    }

    pub async fn cancel(&self, id: i64) -> ServiceResult<()> {
        self.finish(id, MissionStatus::Cancelled, today()).await
    }

    /// Record the outcome and free the mission's vehicles and driver, in one
    /// transaction.
    async fn finish(&self, id: i64, status: MissionStatus, day: NaiveDate) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        let mission = open_mission(&mut uow, id).await?;
        let finished = Mission {
            end_date: Some(day),
            status,
            ..mission.clone()
        };
        finished.validate()?;

        let mut missions = MissionRepo::new(&mut uow);
        missions.update(id, &finished).await?;
        let vehicle_ids: Vec<i64> = missions
            .list_vehicles(id)
            .await?
            .into_iter()
            .filter_map(|v| v.id)
            .collect();

        let released = VehicleRepo::new(&mut uow)
            .update_status_many(&vehicle_ids, VehicleStatus::Available)
            .await?;
        if let Some(driver_id) = mission.driver_id {
            DriverRepo::new(&mut uow)
                .update_status(driver_id, DriverStatus::Available)
                .await?;
        }

        uow.commit().await?;
        info!(mission = id, status = %status, vehicles = released, "Mission finished");
        Ok(())
    }
}

/// Load a mission that still accepts changes.
async fn open_mission<S: Session>(session: &mut S, id: i64) -> ServiceResult<Mission> {
    let mission = MissionRepo::new(session)
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("mission", id))?;
    if mission.status.is_terminal() {
        return Err(ServiceError::conflict(format!(
            "mission {id} is {}",
            mission.status
        )));
    }
    Ok(mission)
}
