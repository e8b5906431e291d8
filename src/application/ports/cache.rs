use crate::domain::entities::{SubscriptionListSnapshot, SubscriptionSnapshot};
use async_trait::async_trait;
use uuid::Uuid;

/// Keyed TTL cache for subscription lookups. Two namespaces: single
/// subscription by id, and the per-user list with its count. Staleness is
/// bounded by the TTL plus the explicit evictions performed on mutation.
#[async_trait]
pub trait SubscriptionCache: Send + Sync {
    async fn get_subscription(&self, id: Uuid) -> Option<SubscriptionSnapshot>;
    async fn put_subscription(&self, snapshot: SubscriptionSnapshot);
    async fn evict_subscription(&self, id: Uuid);

    async fn get_user_subscriptions(&self, user_id: Uuid) -> Option<SubscriptionListSnapshot>;
    async fn put_user_subscriptions(&self, user_id: Uuid, list: SubscriptionListSnapshot);
    async fn evict_user_subscriptions(&self, user_id: Uuid);
}
