//! Applications and job orders

use fleet_core::{
    Application, ApplicationStatus, JobOrder, JobOrderStatus, Page, Paginated,
};
use tracing::info;

use super::{generated_key, today, ServiceError, ServiceResult};
use crate::db::{ApplicationRepo, JobOrderRepo, QueryExecutor, UserRepo, VehicleRepo};

#[derive(Debug, Clone)]
pub struct ApplicationService {
    executor: QueryExecutor,
}

impl ApplicationService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn applications(&self) -> ApplicationRepo<QueryExecutor> {
        ApplicationRepo::new(self.executor.clone())
    }

    fn job_orders(&self) -> JobOrderRepo<QueryExecutor> {
        JobOrderRepo::new(self.executor.clone())
    }

    /// File an application; it starts `Pending`.
    pub async fn submit(&self, application: &Application) -> ServiceResult<i64> {
        let application = Application {
            id: None,
            submitted_on: today(),
            status: ApplicationStatus::Pending,
            ..application.clone()
        };
        application.validate()?;

        UserRepo::new(self.executor.clone())
            .get(application.applicant_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", application.applicant_id))?;
        if let Some(vehicle_id) = application.vehicle_id {
            VehicleRepo::new(self.executor.clone())
                .get(vehicle_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("vehicle", vehicle_id))?;
        }

        let key = self.applications().create(&application).await?;
        let id = generated_key(key, "applications")?;
        info!(id, kind = %application.kind, "Application submitted");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Application> {
        self.applications()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("application", id))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Application>> {
        Ok(self.applications().list(page).await?)
    }

    pub async fn list_by_status(&self, status: ApplicationStatus) -> ServiceResult<Vec<Application>> {
        Ok(self.applications().list_by_status(status).await?)
    }

    pub async fn list_for_applicant(&self, applicant_id: i64) -> ServiceResult<Vec<Application>> {
        Ok(self.applications().list_for_applicant(applicant_id).await?)
    }

    /// Approve a pending application and open its job order, in one
    /// transaction. Returns the job order key.
    pub async fn approve(&self, id: i64) -> ServiceResult<i64> {
        let mut uow = self.executor.begin().await?;

        let mut applications = ApplicationRepo::new(&mut uow);
        let application = applications
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("application", id))?;
        if !applications
            .update_status(id, ApplicationStatus::Approved)
            .await?
        {
            return Err(already_decided(id));
        }

        let order = JobOrder::for_application(&application, id, today());
        let key = JobOrderRepo::new(&mut uow).create(&order).await?;
        let job_order_id = generated_key(key, "joborders")?;

        uow.commit().await?;
        info!(application = id, job_order = job_order_id, "Application approved");
        Ok(job_order_id)
    }

    pub async fn reject(&self, id: i64) -> ServiceResult<()> {
        let mut repo = self.applications();
        repo.get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("application", id))?;
        if !repo.update_status(id, ApplicationStatus::Rejected).await? {
            return Err(already_decided(id));
        }
        info!(application = id, "Application rejected");
        Ok(())
    }

    pub async fn get_job_order(&self, id: i64) -> ServiceResult<JobOrder> {
        self.job_orders()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("job order", id))
    }

    pub async fn list_job_orders(&self, page: Page) -> ServiceResult<Paginated<JobOrder>> {
        Ok(self.job_orders().list(page).await?)
    }

    pub async fn list_job_orders_by_status(
        &self,
        status: JobOrderStatus,
    ) -> ServiceResult<Vec<JobOrder>> {
        Ok(self.job_orders().list_by_status(status).await?)
    }

    pub async fn job_orders_for_application(&self, application_id: i64) -> ServiceResult<Vec<JobOrder>> {
        Ok(self.job_orders().list_for_application(application_id).await?)
    }

    /// Move a job order along `Open -> InProgress -> Completed`, or cancel
    /// it. Final states stamp the closing date.
    pub async fn move_job_order(&self, id: i64, next: JobOrderStatus) -> ServiceResult<()> {
        let order = self.get_job_order(id).await?;
        if !order.status.can_move_to(next) {
            return Err(ServiceError::conflict(format!(
                "job order {id} cannot move from {} to {next}",
                order.status
            )));
        }

        let mut repo = self.job_orders();
        match next {
            JobOrderStatus::Completed | JobOrderStatus::Cancelled => {
                repo.close(id, next, today()).await?
            }
            _ => repo.update_status(id, next).await?,
        };
        info!(job_order = id, status = %next, "Job order moved");
        Ok(())
    }

    /// Complete an in-progress job order.
    pub async fn close_job_order(&self, id: i64) -> ServiceResult<()> {
        self.move_job_order(id, JobOrderStatus::Completed).await
    }
}

fn already_decided(id: i64) -> ServiceError {
    ServiceError::conflict(format!("application {id} was already decided"))
}
