//! Spare parts and consumables stock

use serde::{Deserialize, Serialize};

use crate::validation::{require_non_negative, require_range, require_text};
use crate::ValidationError;

const MAX_NAME_LEN: usize = 128;
const MAX_UNIT_LEN: usize = 16;

/// Row of `spareparts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    #[serde(default)]
    pub id: Option<i64>,
    pub part_number: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// Stock at or below this level is reported as low
    pub reorder_level: i64,
}

impl SparePart {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("part number", &self.part_number, MAX_NAME_LEN)?;
        require_text("name", &self.name, MAX_NAME_LEN)?;
        require_range("quantity", self.quantity, 0, i64::MAX)?;
        require_range("reorder level", self.reorder_level, 0, i64::MAX)?;
        require_non_negative("unit price", self.unit_price)
    }

    pub fn is_low(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

/// Row of `consumables` (oil, filters, tyres, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumable {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// Unit of measure, e.g. "L" or "pcs"
    pub unit: String,
    pub quantity: i64,
    pub reorder_level: i64,
}

impl Consumable {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, MAX_NAME_LEN)?;
        require_text("unit", &self.unit, MAX_UNIT_LEN)?;
        require_range("quantity", self.quantity, 0, i64::MAX)?;
        require_range("reorder level", self.reorder_level, 0, i64::MAX)
    }

    pub fn is_low(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_is_inclusive() {
        let part = SparePart {
            id: None,
            part_number: "BRK-100".into(),
            name: "Brake pad set".into(),
            quantity: 4,
            unit_price: 35.5,
            reorder_level: 4,
        };
        assert!(part.is_low());
        assert!(part.validate().is_ok());
    }

    #[test]
    fn negative_quantity_rejected() {
        let item = Consumable {
            id: None,
            name: "Engine oil 5W-30".into(),
            unit: "L".into(),
            quantity: -1,
            reorder_level: 20,
        };
        assert!(item.validate().is_err());
    }
}
