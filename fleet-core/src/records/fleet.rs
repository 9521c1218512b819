//! Vehicles and buses

use serde::{Deserialize, Serialize};

use crate::validation::{require_range, require_text, PlateNumbers};
use crate::{FuelType, ValidationError, VehicleKind, VehicleStatus};

const MIN_YEAR: i64 = 1950;
const MAX_YEAR: i64 = 2100;
const MAX_NAME_LEN: usize = 64;

/// Row of `vehicles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default)]
    pub id: Option<i64>,
    pub plate_numbers: String,
    pub manufacturer: String,
    pub model: String,
    pub year: i64,
    pub kind: VehicleKind,
    pub fuel: FuelType,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default)]
    pub odometer_km: i64,
}

impl Vehicle {
    pub fn validate(&self) -> Result<(), ValidationError> {
        PlateNumbers::new(&self.plate_numbers)?;
        require_text("manufacturer", &self.manufacturer, MAX_NAME_LEN)?;
        require_text("model", &self.model, MAX_NAME_LEN)?;
        require_range("year", self.year, MIN_YEAR, MAX_YEAR)?;
        require_range("odometer", self.odometer_km, 0, i64::MAX)?;
        Ok(())
    }
}

/// Row of `buses`; every bus is backed by a vehicle row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    #[serde(default)]
    pub id: Option<i64>,
    pub vehicle_id: i64,
    /// Seats available to patrol subscribers
    pub capacity: i64,
    #[serde(default)]
    pub route_name: Option<String>,
}

impl Bus {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_range("capacity", self.capacity, 1, 120)?;
        crate::validation::optional_text("route name", self.route_name.as_deref(), MAX_NAME_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> Vehicle {
        Vehicle {
            id: None,
            plate_numbers: "ABC1234".into(),
            manufacturer: "Toyota".into(),
            model: "Hilux".into(),
            year: 2021,
            kind: VehicleKind::Truck,
            fuel: FuelType::Diesel,
            status: VehicleStatus::Available,
            odometer_km: 12_000,
        }
    }

    #[test]
    fn valid_vehicle() {
        assert!(vehicle().validate().is_ok());
    }

    #[test]
    fn rejects_bad_plate_and_year() {
        let mut v = vehicle();
        v.plate_numbers = "abc".into();
        assert!(v.validate().is_err());

        let mut v = vehicle();
        v.year = 1900;
        assert!(matches!(
            v.validate().unwrap_err(),
            ValidationError::OutOfRange { field: "year", .. }
        ));
    }

    #[test]
    fn json_shape_is_camel_case() {
        let json = serde_json::to_value(vehicle()).unwrap();
        assert_eq!(json["plateNumbers"], "ABC1234");
        assert_eq!(json["status"], "Available");
        assert!(json["id"].is_null());
    }

    #[test]
    fn bus_capacity_bounds() {
        let bus = Bus {
            id: None,
            vehicle_id: 1,
            capacity: 0,
            route_name: None,
        };
        assert!(bus.validate().is_err());
    }
}
