use crate::application::ports::{SubscriptionCache, SubscriptionRepository, UserRepository};
use crate::domain::entities::{
    OutboxEventType, OutboxRecord, Subscription, SubscriptionCreateRequest,
    SubscriptionListSnapshot, SubscriptionSnapshot, SubscriptionUpdateRequest,
};
use crate::shared::error::AppError;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Mutation service for subscriptions. Every mutation commits the entity
/// write and its outbox record in one repository transaction, then performs
/// the matching best-effort cache write or eviction.
pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn SubscriptionCache>,
}

impl SubscriptionService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn SubscriptionCache>,
    ) -> Self {
        Self {
            subscriptions,
            users,
            cache,
        }
    }

    pub async fn create_subscription(
        &self,
        user_id: &str,
        request: SubscriptionCreateRequest,
    ) -> Result<Subscription, AppError> {
        let user_id = parse_id(user_id, "user id")?;
        validate_currency_pair(&request.currency_pair)?;
        validate_threshold(request.threshold)?;

        if !self.users.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User not found with ID: {user_id}, please try with a different user"
            )));
        }

        let subscription = Subscription::new(
            user_id,
            request.currency_pair,
            request.threshold,
            request.direction,
            request.notification_channels,
        );
        let outbox =
            OutboxRecord::for_subscription(OutboxEventType::Created, subscription.snapshot());

        self.subscriptions
            .create_subscription(&subscription, &outbox)
            .await?;

        tracing::info!(
            subscription_id = %subscription.id,
            user_id = %user_id,
            outbox_id = %outbox.id,
            "subscription created"
        );

        // Cache updates are outside the transaction: stale entries expire
        // with the TTL, the store/outbox pair stays the source of truth.
        self.cache.put_subscription(subscription.snapshot()).await;
        self.cache.evict_user_subscriptions(user_id).await;

        Ok(subscription)
    }

    pub async fn update_subscription(
        &self,
        id: &str,
        request: SubscriptionUpdateRequest,
    ) -> Result<Subscription, AppError> {
        let id = parse_id(id, "subscription id")?;
        if let Some(currency_pair) = &request.currency_pair {
            validate_currency_pair(currency_pair)?;
        }
        if let Some(threshold) = request.threshold {
            validate_threshold(threshold)?;
        }

        let mut subscription = self
            .subscriptions
            .get_subscription(id)
            .await?
            .ok_or_else(|| subscription_not_found(id))?;

        subscription.apply_update(&request);
        let outbox =
            OutboxRecord::for_subscription(OutboxEventType::Updated, subscription.snapshot());

        self.subscriptions
            .update_subscription(&subscription, &outbox)
            .await?;

        tracing::info!(
            subscription_id = %subscription.id,
            outbox_id = %outbox.id,
            "subscription updated"
        );

        self.cache.put_subscription(subscription.snapshot()).await;
        self.cache
            .evict_user_subscriptions(subscription.user_id)
            .await;

        Ok(subscription)
    }

    pub async fn delete_subscription(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(id, "subscription id")?;
        let subscription = self
            .subscriptions
            .get_subscription(id)
            .await?
            .ok_or_else(|| subscription_not_found(id))?;

        // Payload is the pre-delete snapshot; consumers see the last state.
        let outbox =
            OutboxRecord::for_subscription(OutboxEventType::Deleted, subscription.snapshot());

        self.subscriptions.delete_subscription(id, &outbox).await?;

        tracing::info!(
            subscription_id = %id,
            outbox_id = %outbox.id,
            "subscription deleted"
        );

        self.cache.evict_subscription(id).await;
        self.cache
            .evict_user_subscriptions(subscription.user_id)
            .await;

        Ok(())
    }

    pub async fn find_subscription_by_id(&self, id: &str) -> Result<SubscriptionSnapshot, AppError> {
        let id = parse_id(id, "subscription id")?;

        if let Some(snapshot) = self.cache.get_subscription(id).await {
            return Ok(snapshot);
        }

        let subscription = self
            .subscriptions
            .get_subscription(id)
            .await?
            .ok_or_else(|| subscription_not_found(id))?;

        let snapshot = subscription.snapshot();
        self.cache.put_subscription(snapshot.clone()).await;
        Ok(snapshot)
    }

    pub async fn find_subscriptions_by_user(
        &self,
        user_id: &str,
    ) -> Result<SubscriptionListSnapshot, AppError> {
        let user_id = parse_id(user_id, "user id")?;

        if let Some(list) = self.cache.get_user_subscriptions(user_id).await {
            return Ok(list);
        }

        let subscriptions = self.subscriptions.get_subscriptions_by_user(user_id).await?;

        // An empty list is never cached: the moment the user creates a
        // subscription the negative entry would be stale.
        if subscriptions.is_empty() {
            return Err(AppError::NotFound(format!(
                "No subscriptions found for the user ID: {user_id}, please try with a different user"
            )));
        }

        let list = SubscriptionListSnapshot::from_subscriptions(&subscriptions);
        self.cache
            .put_user_subscriptions(user_id, list.clone())
            .await;
        Ok(list)
    }
}

fn parse_id(value: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|_| AppError::ValidationError(format!("Invalid {what}: {value}")))
}

fn subscription_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!(
        "No subscription found for the ID: {id}, please try with a different id"
    ))
}

fn validate_currency_pair(currency_pair: &str) -> Result<(), AppError> {
    if currency_pair.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Currency pair is mandatory and should not be blank".to_string(),
        ));
    }
    Ok(())
}

fn validate_threshold(threshold: Decimal) -> Result<(), AppError> {
    if threshold <= Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Threshold is mandatory and should be a positive number".to_string(),
        ));
    }
    Ok(())
}
