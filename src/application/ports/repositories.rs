use crate::domain::entities::{FxUser, OutboxRecord, OutboxStatus, Subscription};
use crate::shared::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Authoritative store for subscriptions. Every mutation takes the outbox
/// record that documents it; implementations must commit both in one
/// transaction so a committed mutation always has its change record.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create_subscription(
        &self,
        subscription: &Subscription,
        outbox: &OutboxRecord,
    ) -> Result<(), AppError>;
    async fn update_subscription(
        &self,
        subscription: &Subscription,
        outbox: &OutboxRecord,
    ) -> Result<(), AppError>;
    async fn delete_subscription(&self, id: Uuid, outbox: &OutboxRecord) -> Result<(), AppError>;
    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, AppError>;
    async fn get_subscriptions_by_user(&self, user_id: Uuid)
    -> Result<Vec<Subscription>, AppError>;
}

#[async_trait]
pub trait OutboxRepository: Send + Sync {
    async fn insert(&self, record: &OutboxRecord) -> Result<(), AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OutboxRecord>, AppError>;
    async fn find_by_status(&self, status: OutboxStatus) -> Result<Vec<OutboxRecord>, AppError>;
    /// Returns false when the record was not in `Pending` state anymore;
    /// terminal statuses never transition again.
    async fn update_status(&self, id: Uuid, status: OutboxStatus) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &FxUser) -> Result<(), AppError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<FxUser>, AppError>;
    async fn user_exists(&self, id: Uuid) -> Result<bool, AppError>;
}
