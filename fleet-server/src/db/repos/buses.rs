//! Bus repository
//!
//! A bus row extends one vehicle row. Lookups by plate resolve the vehicle
//! first through [`VehicleRepo`] on the same session.

use fleet_core::{Bus, Page, Paginated, Vehicle};
use sqlx::any::AnyRow;
use sqlx::Row;

use super::VehicleRepo;
use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for Bus {
    const TABLE: &'static str = "buses";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &["vehicle_id", "capacity", "route_name"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            capacity: row.try_get("capacity")?,
            route_name: row.try_get("route_name")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(self.vehicle_id),
            SqlValue::from(self.capacity),
            SqlValue::from(self.route_name.clone()),
        ]
    }
}

impl Keyed for Bus {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// Bus repository
pub struct BusRepo<S> {
    table: Table<Bus, S>,
}

impl<S: Session> BusRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, bus: &Bus) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(bus).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Bus>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn get_by_vehicle(&mut self, vehicle_id: i64) -> Result<Option<Bus>, DataAccessError> {
        self.table.find_one(Filter::eq("vehicle_id", vehicle_id)).await
    }

    /// The bus registered under `plate`, with its vehicle.
    pub async fn get_by_plate(
        &mut self,
        plate: &str,
    ) -> Result<Option<(Bus, Vehicle)>, DataAccessError> {
        let vehicle = VehicleRepo::new(self.table.session())
            .get_vehicle_by_plate_numbers(plate)
            .await?;
        let Some(vehicle) = vehicle else {
            return Ok(None);
        };
        let Some(vehicle_id) = vehicle.id else {
            return Ok(None);
        };
        Ok(self.get_by_vehicle(vehicle_id).await?.map(|bus| (bus, vehicle)))
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Bus>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_by_route(&mut self, route_name: &str) -> Result<Vec<Bus>, DataAccessError> {
        self.table
            .find(Filter::eq("route_name", route_name), "id", None)
            .await
    }

    pub async fn update(&mut self, id: i64, bus: &Bus) -> Result<bool, DataAccessError> {
        self.table.update(id, bus).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}
