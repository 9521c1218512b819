//! Spare parts and consumables
//!
//! Stock changes are single guarded statements: a withdrawal only applies
//! when enough stock is on hand, so concurrent withdrawals never go negative.

use fleet_core::{Consumable, Page, Paginated, SparePart};
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::db::{DataAccessError, Filter, Keyed, Record, Session, SqlValue, Table};

impl Record for SparePart {
    const TABLE: &'static str = "spareparts";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] =
        &["part_number", "name", "quantity", "unit_price", "reorder_level"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            part_number: row.try_get("part_number")?,
            name: row.try_get("name")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            reorder_level: row.try_get("reorder_level")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(&self.part_number),
            SqlValue::from(&self.name),
            SqlValue::from(self.quantity),
            SqlValue::from(self.unit_price),
            SqlValue::from(self.reorder_level),
        ]
    }
}

impl Keyed for SparePart {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

impl Record for Consumable {
    const TABLE: &'static str = "consumables";
    const KEY: Option<&'static str> = Some("id");
    const COLUMNS: &'static [&'static str] = &["name", "unit", "quantity", "reorder_level"];

    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            unit: row.try_get("unit")?,
            quantity: row.try_get("quantity")?,
            reorder_level: row.try_get("reorder_level")?,
        })
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::from(&self.name),
            SqlValue::from(&self.unit),
            SqlValue::from(self.quantity),
            SqlValue::from(self.reorder_level),
        ]
    }
}

impl Keyed for Consumable {
    fn key(&self) -> Option<i64> {
        self.id
    }
}

fn low_stock() -> Filter {
    Filter::raw("quantity <= reorder_level")
}

// The headroom check keeps `quantity + amount` inside BIGINT.
fn restock_filter(id: i64, amount: i64) -> Filter {
    Filter::eq("id", id)
        .and("quantity <= @headroom")
        .param("amount", amount)
        .param("headroom", i64::MAX.saturating_sub(amount))
}

fn withdraw_filter(id: i64, amount: i64) -> Filter {
    Filter::eq("id", id)
        .and("quantity >= @amount")
        .param("amount", amount)
}

/// Spare part repository
pub struct SparePartRepo<S> {
    table: Table<SparePart, S>,
}

impl<S: Session> SparePartRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, part: &SparePart) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(part).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<SparePart>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn get_by_part_number(
        &mut self,
        part_number: &str,
    ) -> Result<Option<SparePart>, DataAccessError> {
        self.table.find_one(Filter::eq("part_number", part_number)).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<SparePart>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_low_stock(&mut self) -> Result<Vec<SparePart>, DataAccessError> {
        self.table.find(low_stock(), "part_number", None).await
    }

    pub async fn update(&mut self, id: i64, part: &SparePart) -> Result<bool, DataAccessError> {
        self.table.update(id, part).await
    }

    /// Add `amount` to stock. `false` if the part is missing or the new
    /// quantity would not fit.
    pub async fn restock(&mut self, id: i64, amount: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where("quantity = quantity + @amount", restock_filter(id, amount))
            .await
    }

    /// Take `amount` out of stock. `false` if the part is missing or short.
    pub async fn withdraw(&mut self, id: i64, amount: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where("quantity = quantity - @amount", withdraw_filter(id, amount))
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}

/// Consumable repository
pub struct ConsumableRepo<S> {
    table: Table<Consumable, S>,
}

impl<S: Session> ConsumableRepo<S> {
    pub fn new(session: S) -> Self {
        Self {
            table: Table::new(session),
        }
    }

    pub async fn create(&mut self, item: &Consumable) -> Result<Option<i64>, DataAccessError> {
        self.table.insert(item).await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Consumable>, DataAccessError> {
        self.table.get(id).await
    }

    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<Consumable>, DataAccessError> {
        self.table.find_one(Filter::eq("name", name)).await
    }

    pub async fn list(&mut self, page: Page) -> Result<Paginated<Consumable>, DataAccessError> {
        self.table.page(Filter::all(), page).await
    }

    pub async fn list_low_stock(&mut self) -> Result<Vec<Consumable>, DataAccessError> {
        self.table.find(low_stock(), "name", None).await
    }

    pub async fn update(&mut self, id: i64, item: &Consumable) -> Result<bool, DataAccessError> {
        self.table.update(id, item).await
    }

    pub async fn restock(&mut self, id: i64, amount: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where("quantity = quantity + @amount", restock_filter(id, amount))
            .await
    }

    pub async fn withdraw(&mut self, id: i64, amount: i64) -> Result<bool, DataAccessError> {
        self.table
            .update_where("quantity = quantity - @amount", withdraw_filter(id, amount))
            .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, DataAccessError> {
        self.table.delete(id).await
    }
}
