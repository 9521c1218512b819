//! Vehicles and buses

use fleet_core::{
    Bus, Page, Paginated, PlateNumbers, Vehicle, VehicleKind, VehicleStatus,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{generated_key, ServiceError, ServiceResult};
use crate::db::{BusRepo, QueryExecutor, VehicleRepo};

#[derive(Debug, Clone)]
pub struct VehicleService {
    executor: QueryExecutor,
}

impl VehicleService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn repo(&self) -> VehicleRepo<QueryExecutor> {
        VehicleRepo::new(self.executor.clone())
    }

    /// Register a vehicle. Plate numbers must be unused.
    pub async fn create(&self, vehicle: &Vehicle) -> ServiceResult<i64> {
        vehicle.validate()?;
        let mut repo = self.repo();
        if repo.is_vehicle_exists(&vehicle.plate_numbers).await? {
            return Err(plate_taken(&vehicle.plate_numbers));
        }
        let key = repo
            .create(vehicle)
            .await
            .map_err(|e| ServiceError::from_write(e, plate_taken_message(&vehicle.plate_numbers)))?;
        let id = generated_key(key, "vehicles")?;
        info!(id, plate = %vehicle.plate_numbers, "Vehicle registered");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Vehicle> {
        self.repo()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", id))
    }

    pub async fn get_by_plate(&self, plate: &PlateNumbers) -> ServiceResult<Vehicle> {
        self.repo()
            .get_vehicle_by_plate_numbers(plate.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", plate.as_str()))
    }

    pub async fn exists(&self, plate: &PlateNumbers) -> ServiceResult<bool> {
        Ok(self.repo().is_vehicle_exists(plate.as_str()).await?)
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Vehicle>> {
        Ok(self.repo().list(page).await?)
    }

    pub async fn list_by_status(&self, status: VehicleStatus) -> ServiceResult<Vec<Vehicle>> {
        Ok(self.repo().list_by_status(status).await?)
    }

    pub async fn count(&self, status: Option<VehicleStatus>) -> ServiceResult<i64> {
        let mut repo = self.repo();
        let count = match status {
            Some(status) => repo.count_by_status(status).await?,
            None => repo.count().await?,
        };
        Ok(count)
    }

    /// Replace the vehicle registered under `plate`. A changed plate must be
    /// unused.
    pub async fn update(&self, plate: &PlateNumbers, vehicle: &Vehicle) -> ServiceResult<()> {
        vehicle.validate()?;
        let mut repo = self.repo();
        if vehicle.plate_numbers != plate.as_str()
            && repo.is_vehicle_exists(&vehicle.plate_numbers).await?
        {
            return Err(plate_taken(&vehicle.plate_numbers));
        }
        let updated = repo
            .update_by_plate(plate.as_str(), vehicle)
            .await
            .map_err(|e| ServiceError::from_write(e, plate_taken_message(&vehicle.plate_numbers)))?;
        if !updated {
            return Err(ServiceError::not_found("vehicle", plate.as_str()));
        }
        Ok(())
    }

    pub async fn set_status(&self, plate: &PlateNumbers, status: VehicleStatus) -> ServiceResult<()> {
        let vehicle = self.get_by_plate(plate).await?;
        let id = vehicle
            .id
            .ok_or_else(|| ServiceError::not_found("vehicle", plate.as_str()))?;
        self.repo().update_status(id, status).await?;
        info!(plate = %plate.as_str(), status = %status, "Vehicle status changed");
        Ok(())
    }

    /// Remove a vehicle. Vehicles still referenced elsewhere are kept.
    pub async fn delete(&self, plate: &PlateNumbers) -> ServiceResult<()> {
        let deleted = self
            .repo()
            .delete_by_plate(plate.as_str())
            .await
            .map_err(|e| {
                ServiceError::from_write(e, format!("vehicle '{}' is still in use", plate.as_str()))
            })?;
        if !deleted {
            return Err(ServiceError::not_found("vehicle", plate.as_str()));
        }
        info!(plate = %plate.as_str(), "Vehicle removed");
        Ok(())
    }
}

fn plate_taken_message(plate: &str) -> String {
    format!("plate numbers '{plate}' already registered")
}

fn plate_taken(plate: &str) -> ServiceError {
    ServiceError::conflict(plate_taken_message(plate))
}

/// A bus to create together with its vehicle row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBus {
    pub vehicle: Vehicle,
    pub capacity: i64,
    #[serde(default)]
    pub route_name: Option<String>,
}

/// A bus with the vehicle it extends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDetails {
    pub bus: Bus,
    pub vehicle: Vehicle,
}

#[derive(Debug, Clone)]
pub struct BusService {
    executor: QueryExecutor,
}

impl BusService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Create the vehicle and bus rows in one transaction. The vehicle kind
    /// is always `Bus`. Returns the bus key.
    pub async fn create(&self, new_bus: NewBus) -> ServiceResult<i64> {
        let NewBus {
            mut vehicle,
            capacity,
            route_name,
        } = new_bus;
        vehicle.kind = VehicleKind::Bus;
        vehicle.validate()?;
        let mut bus = Bus {
            id: None,
            vehicle_id: 0,
            capacity,
            route_name,
        };
        bus.validate()?;

        let mut uow = self.executor.begin().await?;

        let mut vehicles = VehicleRepo::new(&mut uow);
        if vehicles.is_vehicle_exists(&vehicle.plate_numbers).await? {
            return Err(plate_taken(&vehicle.plate_numbers));
        }
        let key = vehicles
            .create(&vehicle)
            .await
            .map_err(|e| ServiceError::from_write(e, plate_taken_message(&vehicle.plate_numbers)))?;
        bus.vehicle_id = generated_key(key, "vehicles")?;

        let key = BusRepo::new(&mut uow).create(&bus).await?;
        let id = generated_key(key, "buses")?;

        uow.commit().await?;
        info!(id, plate = %vehicle.plate_numbers, capacity, "Bus registered");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<BusDetails> {
        let mut buses = BusRepo::new(self.executor.clone());
        let bus = buses
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("bus", id))?;
        let vehicle = VehicleRepo::new(self.executor.clone())
            .get(bus.vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", bus.vehicle_id))?;
        Ok(BusDetails { bus, vehicle })
    }

    pub async fn get_by_plate(&self, plate: &PlateNumbers) -> ServiceResult<BusDetails> {
        BusRepo::new(self.executor.clone())
            .get_by_plate(plate.as_str())
            .await?
            .map(|(bus, vehicle)| BusDetails { bus, vehicle })
            .ok_or_else(|| ServiceError::not_found("bus", plate.as_str()))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Bus>> {
        Ok(BusRepo::new(self.executor.clone()).list(page).await?)
    }

    pub async fn list_by_route(&self, route_name: &str) -> ServiceResult<Vec<Bus>> {
        Ok(BusRepo::new(self.executor.clone())
            .list_by_route(route_name)
            .await?)
    }

    /// Delete the bus and its vehicle in one transaction.
    pub async fn delete_by_plate(&self, plate: &PlateNumbers) -> ServiceResult<()> {
        let mut uow = self.executor.begin().await?;

        let mut buses = BusRepo::new(&mut uow);
        let (bus, vehicle) = buses
            .get_by_plate(plate.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found("bus", plate.as_str()))?;
        let in_use = || format!("bus '{}' is still in use", plate.as_str());

        if let Some(id) = bus.id {
            buses
                .delete(id)
                .await
                .map_err(|e| ServiceError::from_write(e, in_use()))?;
        }
        if let Some(id) = vehicle.id {
            VehicleRepo::new(&mut uow)
                .delete(id)
                .await
                .map_err(|e| ServiceError::from_write(e, in_use()))?;
        }

        uow.commit().await?;
        info!(plate = %plate.as_str(), "Bus removed");
        Ok(())
    }
}
