//! Maintenance scheduling and maintenance applications

use chrono::NaiveDate;
use fleet_core::{
    ApplicationStatus, Maintenance, MaintenanceApplication, MaintenanceKind, MaintenanceStatus,
    Page, Paginated, VehicleStatus,
};
use serde::Deserialize;
use tracing::info;

use super::{generated_key, today, ServiceError, ServiceResult};
use crate::db::{
    MaintenanceApplicationRepo, MaintenanceRepo, QueryExecutor, Session, UserRepo, VehicleRepo,
};

/// What the approver decides when turning an application into a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTerms {
    pub kind: MaintenanceKind,
    #[serde(default)]
    pub cost: f64,
    pub scheduled_on: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct MaintenanceService {
    executor: QueryExecutor,
}

impl MaintenanceService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn records(&self) -> MaintenanceRepo<QueryExecutor> {
        MaintenanceRepo::new(self.executor.clone())
    }

    fn applications(&self) -> MaintenanceApplicationRepo<QueryExecutor> {
        MaintenanceApplicationRepo::new(self.executor.clone())
    }

    /// Schedule maintenance and take the vehicle out of service, in one
    /// transaction.
    pub async fn schedule(&self, record: &Maintenance) -> ServiceResult<i64> {
        let record = Maintenance {
            id: None,
            completed_on: None,
            status: MaintenanceStatus::Scheduled,
            ..record.clone()
        };
        record.validate()?;

        let mut uow = self.executor.begin().await?;
        let id = insert_scheduled(&mut uow, &record).await?;
        uow.commit().await?;

        info!(id, vehicle = record.vehicle_id, "Maintenance scheduled");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Maintenance> {
        self.records()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("maintenance", id))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Maintenance>> {
        Ok(self.records().list(page).await?)
    }

    pub async fn list_for_vehicle(&self, vehicle_id: i64) -> ServiceResult<Vec<Maintenance>> {
        Ok(self.records().list_for_vehicle(vehicle_id).await?)
    }

    pub async fn list_by_status(&self, status: MaintenanceStatus) -> ServiceResult<Vec<Maintenance>> {
        Ok(self.records().list_by_status(status).await?)
    }

    /// Mark work as started.
    pub async fn start(&self, id: i64) -> ServiceResult<()> {
        let record = self.get(id).await?;
        if record.status != MaintenanceStatus::Scheduled {
            return Err(not_open(id, record.status));
        }
        self.records()
            .update_status(id, MaintenanceStatus::InProgress)
            .await?;
        Ok(())
    }

    /// Complete the record and return the vehicle to service once no other
    /// open maintenance remains, in one transaction.
    pub async fn complete(&self, id: i64, day: Option<NaiveDate>) -> ServiceResult<()> {
        self.close(id, MaintenanceStatus::Completed, day.unwrap_or_else(today))
            .await
    }

    /// Cancel an open record; the vehicle is released as for completion.
    pub async fn cancel(&self, id: i64) -> ServiceResult<()> {
        self.close(id, MaintenanceStatus::Cancelled, today()).await
    }

    async fn close(&self, id: i64, status: MaintenanceStatus, day: NaiveDate) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        let mut records = MaintenanceRepo::new(&mut uow);
        let record = records
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("maintenance", id))?;
        if !record.status.is_open() {
            return Err(not_open(id, record.status));
        }
        if day < record.scheduled_on {
            return Err(fleet_core::ValidationError::InvertedRange {
                field: "maintenance",
            }
            .into());
        }

        match status {
            MaintenanceStatus::Completed => records.complete(id, day).await?,
            _ => records.update_status(id, status).await?,
        };
        let still_open = records.has_open_for_vehicle(record.vehicle_id).await?;
        if !still_open {
            VehicleRepo::new(&mut uow)
                .update_status(record.vehicle_id, VehicleStatus::Available)
                .await?;
        }

        uow.commit().await?;
        info!(id, vehicle = record.vehicle_id, status = %status, "Maintenance closed");
        Ok(())
    }

    /// File a maintenance application for a vehicle.
    pub async fn submit_application(
        &self,
        application: &MaintenanceApplication,
    ) -> ServiceResult<i64> {
        let application = MaintenanceApplication {
            id: None,
            submitted_on: today(),
            status: ApplicationStatus::Pending,
            maintenance_id: None,
            ..application.clone()
        };
        application.validate()?;

        VehicleRepo::new(self.executor.clone())
            .get(application.vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", application.vehicle_id))?;
        UserRepo::new(self.executor.clone())
            .get(application.requested_by)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", application.requested_by))?;

        let key = self.applications().create(&application).await?;
        generated_key(key, "maintenanceapplications")
    }

    pub async fn get_application(&self, id: i64) -> ServiceResult<MaintenanceApplication> {
        self.applications()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("maintenance application", id))
    }

    pub async fn list_applications(
        &self,
        page: Page,
    ) -> ServiceResult<Paginated<MaintenanceApplication>> {
        Ok(self.applications().list(page).await?)
    }

    pub async fn list_pending_applications(&self) -> ServiceResult<Vec<MaintenanceApplication>> {
        Ok(self.applications().list_pending().await?)
    }

    pub async fn list_applications_for_vehicle(
        &self,
        vehicle_id: i64,
    ) -> ServiceResult<Vec<MaintenanceApplication>> {
        Ok(self.applications().list_for_vehicle(vehicle_id).await?)
    }

    /// Approve a pending application: create the maintenance record, take
    /// the vehicle out of service and link the record, in one transaction.
    /// Returns the new maintenance key.
    pub async fn approve_application(&self, id: i64, terms: MaintenanceTerms) -> ServiceResult<i64> {
        let mut uow = self.executor.begin().await?;

        let application = MaintenanceApplicationRepo::new(&mut uow)
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("maintenance application", id))?;
        if application.status != ApplicationStatus::Pending {
            return Err(application_decided(id));
        }

        let record = Maintenance {
            id: None,
            vehicle_id: application.vehicle_id,
            kind: terms.kind,
            description: application.description.clone(),
            cost: terms.cost,
            scheduled_on: terms.scheduled_on,
            completed_on: None,
            status: MaintenanceStatus::Scheduled,
        };
        record.validate()?;
        let maintenance_id = insert_scheduled(&mut uow, &record).await?;

        if !MaintenanceApplicationRepo::new(&mut uow)
            .decide(id, ApplicationStatus::Approved, Some(maintenance_id))
            .await?
        {
            return Err(application_decided(id));
        }

        uow.commit().await?;
        info!(application = id, maintenance = maintenance_id, "Maintenance application approved");
        Ok(maintenance_id)
    }

    pub async fn reject_application(&self, id: i64) -> ServiceResult<()> {
        let mut repo = self.applications();
        repo.get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("maintenance application", id))?;
        if !repo.decide(id, ApplicationStatus::Rejected, None).await? {
            return Err(application_decided(id));
        }
        info!(application = id, "Maintenance application rejected");
        Ok(())
    }
}

/// Insert a scheduled record and mark its vehicle `InMaintenance`.
async fn insert_scheduled<S: Session>(session: &mut S, record: &Maintenance) -> ServiceResult<i64> {
    let mut vehicles = VehicleRepo::new(&mut *session);
    let vehicle = vehicles
        .get(record.vehicle_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("vehicle", record.vehicle_id))?;
    if vehicle.status == VehicleStatus::OnMission {
        return Err(ServiceError::conflict(format!(
            "vehicle '{}' is on a mission",
            vehicle.plate_numbers
        )));
    }
    vehicles
        .update_status(record.vehicle_id, VehicleStatus::InMaintenance)
        .await?;

    let key = MaintenanceRepo::new(&mut *session).create(record).await?;
    generated_key(key, "maintenance")
}

fn not_open(id: i64, status: MaintenanceStatus) -> ServiceError {
    ServiceError::conflict(format!("maintenance {id} is {status}"))
}

fn application_decided(id: i64) -> ServiceError {
    ServiceError::conflict(format!("maintenance application {id} was already decided"))
}
