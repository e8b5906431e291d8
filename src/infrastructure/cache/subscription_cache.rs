use super::memory_cache::MemoryCacheService;
use crate::application::ports::SubscriptionCache;
use crate::domain::entities::{SubscriptionListSnapshot, SubscriptionSnapshot};
use async_trait::async_trait;
use uuid::Uuid;

/// `SubscriptionCache` implementation over two namespaced TTL caches: one
/// for single-subscription snapshots, one for per-user list snapshots.
pub struct SubscriptionCacheService {
    subscriptions: MemoryCacheService<SubscriptionSnapshot>,
    user_lists: MemoryCacheService<SubscriptionListSnapshot>,
}

impl SubscriptionCacheService {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            subscriptions: MemoryCacheService::new(ttl_seconds),
            user_lists: MemoryCacheService::new(ttl_seconds),
        }
    }

    fn subscription_key(id: Uuid) -> String {
        format!("subscription:{id}")
    }

    fn user_list_key(user_id: Uuid) -> String {
        format!("subscriptions_by_user:{user_id}")
    }
}

#[async_trait]
impl SubscriptionCache for SubscriptionCacheService {
    async fn get_subscription(&self, id: Uuid) -> Option<SubscriptionSnapshot> {
        self.subscriptions.get(&Self::subscription_key(id)).await
    }

    async fn put_subscription(&self, snapshot: SubscriptionSnapshot) {
        self.subscriptions
            .set(Self::subscription_key(snapshot.id), snapshot)
            .await;
    }

    async fn evict_subscription(&self, id: Uuid) {
        self.subscriptions.delete(&Self::subscription_key(id)).await;
    }

    async fn get_user_subscriptions(&self, user_id: Uuid) -> Option<SubscriptionListSnapshot> {
        self.user_lists.get(&Self::user_list_key(user_id)).await
    }

    async fn put_user_subscriptions(&self, user_id: Uuid, list: SubscriptionListSnapshot) {
        self.user_lists.set(Self::user_list_key(user_id), list).await;
    }

    async fn evict_user_subscriptions(&self, user_id: Uuid) {
        self.user_lists.delete(&Self::user_list_key(user_id)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Subscription, ThresholdDirection};
    use rust_decimal::Decimal;

    fn snapshot(user_id: Uuid) -> SubscriptionSnapshot {
        Subscription::new(
            user_id,
            "EUR/USD".to_string(),
            Decimal::new(110, 2),
            ThresholdDirection::Below,
            vec![],
        )
        .snapshot()
    }

    #[tokio::test]
    async fn namespaces_are_independent() {
        let cache = SubscriptionCacheService::new(60);
        let user_id = Uuid::new_v4();
        let snap = snapshot(user_id);
        let list = SubscriptionListSnapshot {
            subscriptions: vec![snap.clone()],
            total_count: 1,
        };

        cache.put_subscription(snap.clone()).await;
        cache.put_user_subscriptions(user_id, list.clone()).await;

        assert_eq!(cache.get_subscription(snap.id).await, Some(snap.clone()));
        assert_eq!(cache.get_user_subscriptions(user_id).await, Some(list));

        cache.evict_user_subscriptions(user_id).await;
        assert!(cache.get_user_subscriptions(user_id).await.is_none());
        // Evicting the list leaves the single-entry namespace alone.
        assert_eq!(cache.get_subscription(snap.id).await, Some(snap));
    }

    #[tokio::test]
    async fn evict_subscription_only_touches_that_id() {
        let cache = SubscriptionCacheService::new(60);
        let first = snapshot(Uuid::new_v4());
        let second = snapshot(Uuid::new_v4());

        cache.put_subscription(first.clone()).await;
        cache.put_subscription(second.clone()).await;
        cache.evict_subscription(first.id).await;

        assert!(cache.get_subscription(first.id).await.is_none());
        assert_eq!(cache.get_subscription(second.id).await, Some(second));
    }
}
