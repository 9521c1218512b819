//! Users, drivers and vacations

use chrono::NaiveDate;
use fleet_core::{
    Driver, DriverStatus, Page, Paginated, User, UserRole, Vacation, VacationStatus,
    VehicleStatus,
};
use tracing::info;

use super::{generated_key, today, ServiceError, ServiceResult};
use crate::db::{DriverRepo, QueryExecutor, UserRepo, VacationRepo, VehicleRepo};

#[derive(Debug, Clone)]
pub struct UserService {
    executor: QueryExecutor,
}

impl UserService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn repo(&self) -> UserRepo<QueryExecutor> {
        UserRepo::new(self.executor.clone())
    }

    /// Create a user stamped with today's date. Usernames are unique.
    pub async fn create(&self, user: &User) -> ServiceResult<i64> {
        let user = User {
            id: None,
            created_on: today(),
            ..user.clone()
        };
        user.validate()?;

        let mut repo = self.repo();
        if repo.username_exists(&user.username).await? {
            return Err(username_taken(&user.username));
        }
        let key = repo
            .create(&user)
            .await
            .map_err(|e| ServiceError::from_write(e, username_taken_message(&user.username)))?;
        let id = generated_key(key, "users")?;
        info!(id, username = %user.username, role = %user.role, "User created");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<User> {
        self.repo()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    pub async fn get_by_username(&self, username: &str) -> ServiceResult<User> {
        self.repo()
            .get_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", username))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<User>> {
        Ok(self.repo().list(page).await?)
    }

    pub async fn list_by_role(&self, role: UserRole) -> ServiceResult<Vec<User>> {
        Ok(self.repo().list_by_role(role).await?)
    }

    /// Replace user `id`; keeps the original creation date.
    pub async fn update(&self, id: i64, user: &User) -> ServiceResult<()> {
        user.validate()?;
        let current = self.get(id).await?;
        let mut repo = self.repo();
        if current.username != user.username && repo.username_exists(&user.username).await? {
            return Err(username_taken(&user.username));
        }
        let user = User {
            created_on: current.created_on,
            ..user.clone()
        };
        let updated = repo
            .update(id, &user)
            .await
            .map_err(|e| ServiceError::from_write(e, username_taken_message(&user.username)))?;
        if !updated {
            return Err(ServiceError::not_found("user", id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let deleted = self
            .repo()
            .delete(id)
            .await
            .map_err(|e| ServiceError::from_write(e, format!("user {id} is still referenced")))?;
        if !deleted {
            return Err(ServiceError::not_found("user", id));
        }
        Ok(())
    }
}

fn username_taken_message(username: &str) -> String {
    format!("username '{username}' already taken")
}

fn username_taken(username: &str) -> ServiceError {
    ServiceError::conflict(username_taken_message(username))
}

#[derive(Debug, Clone)]
pub struct DriverService {
    executor: QueryExecutor,
}

impl DriverService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn repo(&self) -> DriverRepo<QueryExecutor> {
        DriverRepo::new(self.executor.clone())
    }

    /// Register a driver. License numbers are unique; a new driver starts
    /// `Available` with no vehicle.
    pub async fn create(&self, driver: &Driver) -> ServiceResult<i64> {
        let driver = Driver {
            id: None,
            status: DriverStatus::Available,
            vehicle_id: None,
            ..driver.clone()
        };
        driver.validate()?;

        let mut repo = self.repo();
        if repo.license_exists(&driver.license_number).await? {
            return Err(license_taken(&driver.license_number));
        }
        let key = repo
            .create(&driver)
            .await
            .map_err(|e| ServiceError::from_write(e, license_taken_message(&driver.license_number)))?;
        let id = generated_key(key, "drivers")?;
        info!(id, license = %driver.license_number, "Driver registered");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Driver> {
        self.repo()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("driver", id))
    }

    pub async fn get_by_license(&self, license: &str) -> ServiceResult<Driver> {
        self.repo()
            .get_by_license(license)
            .await?
            .ok_or_else(|| ServiceError::not_found("driver", license))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Driver>> {
        Ok(self.repo().list(page).await?)
    }

    pub async fn list_available(&self) -> ServiceResult<Vec<Driver>> {
        Ok(self.repo().list_available().await?)
    }

    pub async fn licenses_expiring_before(&self, day: NaiveDate) -> ServiceResult<Vec<Driver>> {
        Ok(self.repo().licenses_expiring_before(day).await?)
    }

    /// Replace driver `id`. Status and vehicle assignment are kept; they
    /// change only through their own operations.
    pub async fn update(&self, id: i64, driver: &Driver) -> ServiceResult<()> {
        driver.validate()?;
        let current = self.get(id).await?;
        let mut repo = self.repo();
        if current.license_number != driver.license_number
            && repo.license_exists(&driver.license_number).await?
        {
            return Err(license_taken(&driver.license_number));
        }
        let driver = Driver {
            status: current.status,
            vehicle_id: current.vehicle_id,
            ..driver.clone()
        };
        let updated = repo
            .update(id, &driver)
            .await
            .map_err(|e| ServiceError::from_write(e, license_taken_message(&driver.license_number)))?;
        if !updated {
            return Err(ServiceError::not_found("driver", id));
        }
        Ok(())
    }

    pub async fn set_status(&self, id: i64, status: DriverStatus) -> ServiceResult<()> {
        if !self.repo().update_status(id, status).await? {
            return Err(ServiceError::not_found("driver", id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let deleted = self
            .repo()
            .delete(id)
            .await
            .map_err(|e| ServiceError::from_write(e, format!("driver {id} is still referenced")))?;
        if !deleted {
            return Err(ServiceError::not_found("driver", id));
        }
        Ok(())
    }

    /// Give the driver a vehicle. The vehicle must be `Available` and not
    /// held by another driver.
    pub async fn assign_vehicle(&self, id: i64, vehicle_id: i64) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        let mut drivers = DriverRepo::new(&mut uow);
        drivers
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("driver", id))?;
        if let Some(holder) = drivers.get_by_vehicle(vehicle_id).await? {
            if holder.id != Some(id) {
                return Err(ServiceError::conflict(format!(
                    "vehicle {vehicle_id} is already assigned to driver {}",
                    holder.full_name
                )));
            }
        }

        let vehicle = VehicleRepo::new(&mut uow)
            .get(vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", vehicle_id))?;
        if vehicle.status != VehicleStatus::Available {
            return Err(ServiceError::conflict(format!(
                "vehicle '{}' is {}",
                vehicle.plate_numbers, vehicle.status
            )));
        }

        DriverRepo::new(&mut uow).assign_vehicle(id, vehicle_id).await?;
        uow.commit().await?;
        info!(driver = id, vehicle = vehicle_id, "Vehicle assigned");
        Ok(())
    }

    pub async fn release_vehicle(&self, id: i64) -> ServiceResult<()> {
        if !self.repo().unassign_vehicle(id).await? {
            return Err(ServiceError::not_found("driver", id));
        }
        info!(driver = id, "Vehicle released");
        Ok(())
    }
}

fn license_taken_message(license: &str) -> String {
    format!("license number '{license}' already registered")
}

fn license_taken(license: &str) -> ServiceError {
    ServiceError::conflict(license_taken_message(license))
}

#[derive(Debug, Clone)]
pub struct VacationService {
    executor: QueryExecutor,
}

impl VacationService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn repo(&self) -> VacationRepo<QueryExecutor> {
        VacationRepo::new(self.executor.clone())
    }

    /// File a vacation request. It may not overlap an approved vacation of
    /// the same driver.
    pub async fn request(&self, vacation: &Vacation) -> ServiceResult<i64> {
        let vacation = Vacation {
            id: None,
            status: VacationStatus::Requested,
            ..vacation.clone()
        };
        vacation.validate()?;

        DriverRepo::new(self.executor.clone())
            .get(vacation.driver_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("driver", vacation.driver_id))?;

        let mut repo = self.repo();
        if repo
            .overlaps_approved(vacation.driver_id, vacation.start_date, vacation.end_date)
            .await?
        {
            return Err(overlap(&vacation));
        }
        let key = repo.create(&vacation).await?;
        generated_key(key, "vacations")
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Vacation> {
        self.repo()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vacation", id))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Vacation>> {
        Ok(self.repo().list(page).await?)
    }

    pub async fn list_for_driver(&self, driver_id: i64) -> ServiceResult<Vec<Vacation>> {
        Ok(self.repo().list_for_driver(driver_id).await?)
    }

    pub async fn list_by_status(&self, status: VacationStatus) -> ServiceResult<Vec<Vacation>> {
        Ok(self.repo().list_by_status(status).await?)
    }

    /// Approve a requested vacation and put the driver on vacation, in one
    /// transaction.
    pub async fn approve(&self, id: i64) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        let mut vacations = VacationRepo::new(&mut uow);
        let vacation = vacations
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vacation", id))?;
        if vacations
            .overlaps_approved(vacation.driver_id, vacation.start_date, vacation.end_date)
            .await?
        {
            return Err(overlap(&vacation));
        }
        if !vacations.decide(id, VacationStatus::Approved).await? {
            return Err(already_decided(id));
        }

        DriverRepo::new(&mut uow)
            .update_status(vacation.driver_id, DriverStatus::OnVacation)
            .await?;

        uow.commit().await?;
        info!(vacation = id, driver = vacation.driver_id, "Vacation approved");
        Ok(())
    }

    pub async fn reject(&self, id: i64) -> ServiceResult<()> {
        let mut repo = self.repo();
        repo.get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vacation", id))?;
        if !repo.decide(id, VacationStatus::Rejected).await? {
            return Err(already_decided(id));
        }
        info!(vacation = id, "Vacation rejected");
        Ok(())
    }
}

fn overlap(vacation: &Vacation) -> ServiceError {
    ServiceError::conflict(format!(
        "driver {} already has an approved vacation between {} and {}",
        vacation.driver_id, vacation.start_date, vacation.end_date
    ))
}

fn already_decided(id: i64) -> ServiceError {
    ServiceError::conflict(format!("vacation {id} was already decided"))
}
