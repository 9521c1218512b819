//! Spare parts and consumables

use fleet_core::{Consumable, Page, Paginated, SparePart};
use serde::Serialize;
use tracing::{info, warn};

use super::{generated_key, require_amount, ServiceError, ServiceResult};
use crate::db::{ConsumableRepo, QueryExecutor, SparePartRepo};

/// Everything at or below its reorder level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockReport {
    pub spare_parts: Vec<SparePart>,
    pub consumables: Vec<Consumable>,
}

#[derive(Debug, Clone)]
pub struct InventoryService {
    executor: QueryExecutor,
}

impl InventoryService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn parts(&self) -> SparePartRepo<QueryExecutor> {
        SparePartRepo::new(self.executor.clone())
    }

    fn consumables(&self) -> ConsumableRepo<QueryExecutor> {
        ConsumableRepo::new(self.executor.clone())
    }

    pub async fn create_part(&self, part: &SparePart) -> ServiceResult<i64> {
        part.validate()?;
        let mut repo = self.parts();
        if repo.get_by_part_number(&part.part_number).await?.is_some() {
            return Err(part_taken(&part.part_number));
        }
        let key = repo
            .create(part)
            .await
            .map_err(|e| ServiceError::from_write(e, part_taken_message(&part.part_number)))?;
        generated_key(key, "spareparts")
    }

    pub async fn get_part(&self, id: i64) -> ServiceResult<SparePart> {
        self.parts()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("spare part", id))
    }

    pub async fn get_part_by_number(&self, part_number: &str) -> ServiceResult<SparePart> {
        self.parts()
            .get_by_part_number(part_number)
            .await?
            .ok_or_else(|| ServiceError::not_found("spare part", part_number))
    }

    pub async fn list_parts(&self, page: Page) -> ServiceResult<Paginated<SparePart>> {
        Ok(self.parts().list(page).await?)
    }

    pub async fn update_part(&self, id: i64, part: &SparePart) -> ServiceResult<()> {
        part.validate()?;
        let updated = self
            .parts()
            .update(id, part)
            .await
            .map_err(|e| ServiceError::from_write(e, part_taken_message(&part.part_number)))?;
        if !updated {
            return Err(ServiceError::not_found("spare part", id));
        }
        Ok(())
    }

    pub async fn delete_part(&self, id: i64) -> ServiceResult<()> {
        if !self.parts().delete(id).await? {
            return Err(ServiceError::not_found("spare part", id));
        }
        Ok(())
    }

    pub async fn restock_part(&self, id: i64, amount: i64) -> ServiceResult<SparePart> {
        require_amount(amount)?;
        if !self.parts().restock(id, amount).await? {
            let part = self.get_part(id).await?;
            return Err(overfull(&part.name, part.quantity, amount));
        }
        self.get_part(id).await
    }

    /// Take parts out of stock; refuses to go below zero.
    pub async fn withdraw_part(&self, id: i64, amount: i64) -> ServiceResult<SparePart> {
        require_amount(amount)?;
        let mut repo = self.parts();
        if !repo.withdraw(id, amount).await? {
            let part = self.get_part(id).await?;
            return Err(insufficient(&part.name, part.quantity, amount));
        }
        let part = self.get_part(id).await?;
        if part.is_low() {
            warn!(part = %part.part_number, quantity = part.quantity, "Spare part low on stock");
        }
        Ok(part)
    }

    pub async fn create_consumable(&self, item: &Consumable) -> ServiceResult<i64> {
        item.validate()?;
        let mut repo = self.consumables();
        if repo.get_by_name(&item.name).await?.is_some() {
            return Err(consumable_taken(&item.name));
        }
        let key = repo
            .create(item)
            .await
            .map_err(|e| ServiceError::from_write(e, consumable_taken_message(&item.name)))?;
        generated_key(key, "consumables")
    }

    pub async fn get_consumable(&self, id: i64) -> ServiceResult<Consumable> {
        self.consumables()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("consumable", id))
    }

    pub async fn get_consumable_by_name(&self, name: &str) -> ServiceResult<Consumable> {
        self.consumables()
            .get_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::not_found("consumable", name))
    }

    pub async fn list_consumables(&self, page: Page) -> ServiceResult<Paginated<Consumable>> {
        Ok(self.consumables().list(page).await?)
    }

    pub async fn update_consumable(&self, id: i64, item: &Consumable) -> ServiceResult<()> {
        item.validate()?;
        let updated = self
            .consumables()
            .update(id, item)
            .await
            .map_err(|e| ServiceError::from_write(e, consumable_taken_message(&item.name)))?;
        if !updated {
            return Err(ServiceError::not_found("consumable", id));
        }
        Ok(())
    }

    pub async fn delete_consumable(&self, id: i64) -> ServiceResult<()> {
        if !self.consumables().delete(id).await? {
            return Err(ServiceError::not_found("consumable", id));
        }
        Ok(())
    }

    pub async fn restock_consumable(&self, id: i64, amount: i64) -> ServiceResult<Consumable> {
        require_amount(amount)?;
        if !self.consumables().restock(id, amount).await? {
            let item = self.get_consumable(id).await?;
            return Err(overfull(&item.name, item.quantity, amount));
        }
        self.get_consumable(id).await
    }

    pub async fn withdraw_consumable(&self, id: i64, amount: i64) -> ServiceResult<Consumable> {
        require_amount(amount)?;
        if !self.consumables().withdraw(id, amount).await? {
            let item = self.get_consumable(id).await?;
            return Err(insufficient(&item.name, item.quantity, amount));
        }
        let item = self.get_consumable(id).await?;
        if item.is_low() {
            warn!(consumable = %item.name, quantity = item.quantity, "Consumable low on stock");
        }
        Ok(item)
    }

    pub async fn low_stock_report(&self) -> ServiceResult<LowStockReport> {
        let spare_parts = self.parts().list_low_stock().await?;
        let consumables = self.consumables().list_low_stock().await?;
        info!(
            spare_parts = spare_parts.len(),
            consumables = consumables.len(),
            "Low stock report"
        );
        Ok(LowStockReport {
            spare_parts,
            consumables,
        })
    }
}

fn part_taken_message(part_number: &str) -> String {
    format!("part number '{part_number}' already registered")
}

fn part_taken(part_number: &str) -> ServiceError {
    ServiceError::conflict(part_taken_message(part_number))
}

fn consumable_taken_message(name: &str) -> String {
    format!("consumable '{name}' already registered")
}

fn consumable_taken(name: &str) -> ServiceError {
    ServiceError::conflict(consumable_taken_message(name))
}

fn overfull(name: &str, on_hand: i64, requested: i64) -> ServiceError {
    ServiceError::conflict(format!(
        "stock of '{name}' cannot take {requested} more: {on_hand} on hand"
    ))
}

fn insufficient(name: &str, on_hand: i64, requested: i64) -> ServiceError {
    ServiceError::conflict(format!(
        "insufficient stock of '{name}': {on_hand} on hand, {requested} requested"
    ))
}
