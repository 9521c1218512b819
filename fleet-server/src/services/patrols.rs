//! Patrols and subscriptions
//!
//! A patrol's capacity is the seat count of its bus. Subscribing locks the
//! patrol row, counts active subscriptions and inserts in one transaction,
//! so two employees cannot take the last seat.

use fleet_core::{
    Page, Paginated, Patrol, PatrolStatus, PatrolSubscription, SubscriptionStatus,
};
use tracing::info;

use super::{generated_key, today, ServiceError, ServiceResult};
use crate::db::{BusRepo, PatrolRepo, QueryExecutor, SubscriptionRepo, UserRepo};

#[derive(Debug, Clone)]
pub struct PatrolService {
    executor: QueryExecutor,
}

impl PatrolService {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn patrols(&self) -> PatrolRepo<QueryExecutor> {
        PatrolRepo::new(self.executor.clone())
    }

    fn subscriptions(&self) -> SubscriptionRepo<QueryExecutor> {
        SubscriptionRepo::new(self.executor.clone())
    }

    /// Create an active patrol on an existing bus.
    pub async fn create(&self, patrol: &Patrol) -> ServiceResult<i64> {
        let patrol = Patrol {
            id: None,
            status: PatrolStatus::Active,
            ..patrol.clone()
        };
        patrol.validate()?;

        BusRepo::new(self.executor.clone())
            .get(patrol.bus_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("bus", patrol.bus_id))?;

        let key = self.patrols().create(&patrol).await?;
        let id = generated_key(key, "patrols")?;
        info!(id, name = %patrol.name, "Patrol created");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Patrol> {
        self.patrols()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("patrol", id))
    }

    pub async fn list(&self, page: Page) -> ServiceResult<Paginated<Patrol>> {
        Ok(self.patrols().list(page).await?)
    }

    pub async fn list_active(&self) -> ServiceResult<Vec<Patrol>> {
        Ok(self.patrols().list_active().await?)
    }

    pub async fn list_for_bus(&self, bus_id: i64) -> ServiceResult<Vec<Patrol>> {
        Ok(self.patrols().list_for_bus(bus_id).await?)
    }

    pub async fn suspend(&self, id: i64) -> ServiceResult<()> {
        self.set_status(id, PatrolStatus::Suspended).await
    }

    pub async fn resume(&self, id: i64) -> ServiceResult<()> {
        self.set_status(id, PatrolStatus::Active).await
    }

    async fn set_status(&self, id: i64, status: PatrolStatus) -> ServiceResult<()> {
        if !self.patrols().update_status(id, status).await? {
            return Err(ServiceError::not_found("patrol", id));
        }
        info!(patrol = id, status = %status, "Patrol status changed");
        Ok(())
    }

    /// Subscribe an employee to an active patrol with a free seat.
    pub async fn subscribe(&self, patrol_id: i64, employee_id: i64) -> ServiceResult<i64> {
        let mut uow = self.executor.begin().await?;

        let mut patrols = PatrolRepo::new(&mut uow);
        patrols.lock(patrol_id).await?;
        let patrol = patrols
            .get(patrol_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("patrol", patrol_id))?;
        if patrol.status != PatrolStatus::Active {
            return Err(ServiceError::conflict(format!(
                "patrol '{}' is {}",
                patrol.name, patrol.status
            )));
        }

        UserRepo::new(&mut uow)
            .get(employee_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", employee_id))?;

        let bus = BusRepo::new(&mut uow)
            .get(patrol.bus_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("bus", patrol.bus_id))?;

        let mut subscriptions = SubscriptionRepo::new(&mut uow);
        if subscriptions.exists_active(employee_id, patrol_id).await? {
            return Err(ServiceError::conflict(format!(
                "user {employee_id} is already subscribed to patrol '{}'",
                patrol.name
            )));
        }
        let taken = subscriptions.count_active_for_patrol(patrol_id).await?;
        if taken >= bus.capacity {
            return Err(ServiceError::conflict(format!(
                "patrol '{}' is full ({} seats)",
                patrol.name, bus.capacity
            )));
        }

        let key = subscriptions
            .create(&PatrolSubscription {
                id: None,
                patrol_id,
                employee_id,
                subscribed_on: today(),
                status: SubscriptionStatus::Active,
            })
            .await?;
        let id = generated_key(key, "patrolssubscriptions")?;

        uow.commit().await?;
        info!(patrol = patrol_id, employee = employee_id, seat = taken + 1, "Subscribed");
        Ok(id)
    }

    /// Cancel a subscription.
    pub async fn unsubscribe(&self, subscription_id: i64) -> ServiceResult<()> {
        let mut repo = self.subscriptions();
        repo.get(subscription_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("subscription", subscription_id))?;
        if !repo.cancel(subscription_id).await? {
            return Err(ServiceError::conflict(format!(
                "subscription {subscription_id} is already cancelled"
            )));
        }
        Ok(())
    }

    pub async fn subscriptions_for_patrol(&self, patrol_id: i64) -> ServiceResult<Vec<PatrolSubscription>> {
        self.get(patrol_id).await?;
        Ok(self.subscriptions().list_for_patrol(patrol_id).await?)
    }

    pub async fn subscriptions_for_employee(
        &self,
        employee_id: i64,
    ) -> ServiceResult<Vec<PatrolSubscription>> {
        Ok(self.subscriptions().list_for_employee(employee_id).await?)
    }
}
