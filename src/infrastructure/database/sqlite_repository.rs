use super::ConnectionPool;
use crate::application::ports::{OutboxRepository, SubscriptionRepository, UserRepository};
use crate::domain::entities::{
    FxUser, OutboxEventType, OutboxRecord, OutboxStatus, Subscription, SubscriptionSnapshot,
    SubscriptionStatus, ThresholdDirection,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

/// SQLite-backed store for subscriptions, owners and the events outbox.
/// Subscription mutations and their outbox records commit in the same
/// transaction; this is what closes the dual-write gap.
pub struct SqliteRepository {
    pool: ConnectionPool,
}

impl SqliteRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }
}

async fn insert_outbox<'e, E>(executor: E, record: &OutboxRecord) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let payload_json = serde_json::to_string(&record.payload)?;

    sqlx::query(
        r#"
        INSERT INTO events_outbox (id, aggregate_type, aggregate_id, event_type, payload, status, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(&record.aggregate_type)
    .bind(record.aggregate_id.to_string())
    .bind(record.event_type.as_str())
    .bind(payload_json)
    .bind(record.status.as_str())
    .bind(record.timestamp)
    .execute(executor)
    .await?;

    Ok(())
}

fn parse_uuid(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::DeserializationError(format!("Invalid uuid column: {e}")))
}

fn parse_millis(value: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid timestamp column: {value}")))
}

fn map_subscription_row(row: &SqliteRow) -> Result<Subscription, AppError> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let currency_pair: String = row.try_get("currency_pair")?;
    let threshold: String = row.try_get("threshold")?;
    let direction: String = row.try_get("direction")?;
    let channels_json: String = row.try_get("notification_channels")?;
    let status: String = row.try_get("status")?;
    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;

    Ok(Subscription {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        currency_pair,
        threshold: Decimal::from_str(&threshold)
            .map_err(|e| AppError::DeserializationError(format!("Invalid threshold column: {e}")))?,
        direction: ThresholdDirection::from_str(&direction)
            .map_err(AppError::DeserializationError)?,
        notification_channels: serde_json::from_str(&channels_json)
            .map_err(|e| AppError::DeserializationError(e.to_string()))?,
        status: SubscriptionStatus::from_str(&status).map_err(AppError::DeserializationError)?,
        created_at: parse_millis(created_at)?,
        updated_at: parse_millis(updated_at)?,
    })
}

fn map_outbox_row(row: &SqliteRow) -> Result<OutboxRecord, AppError> {
    let id: String = row.try_get("id")?;
    let aggregate_type: String = row.try_get("aggregate_type")?;
    let aggregate_id: String = row.try_get("aggregate_id")?;
    let event_type: String = row.try_get("event_type")?;
    let payload_json: String = row.try_get("payload")?;
    let status: String = row.try_get("status")?;
    let timestamp: i64 = row.try_get("timestamp")?;

    let payload: SubscriptionSnapshot = serde_json::from_str(&payload_json)
        .map_err(|e| AppError::DeserializationError(e.to_string()))?;

    Ok(OutboxRecord {
        id: parse_uuid(&id)?,
        aggregate_type,
        aggregate_id: parse_uuid(&aggregate_id)?,
        event_type: OutboxEventType::from_str(&event_type).map_err(AppError::DeserializationError)?,
        payload,
        status: OutboxStatus::from_str(&status).map_err(AppError::DeserializationError)?,
        timestamp,
    })
}

#[async_trait]
impl SubscriptionRepository for SqliteRepository {
    async fn create_subscription(
        &self,
        subscription: &Subscription,
        outbox: &OutboxRecord,
    ) -> Result<(), AppError> {
        let channels_json = serde_json::to_string(&subscription.notification_channels)?;
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO subscriptions
                (id, user_id, currency_pair, threshold, direction, notification_channels, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(subscription.id.to_string())
        .bind(subscription.user_id.to_string())
        .bind(&subscription.currency_pair)
        .bind(subscription.threshold.to_string())
        .bind(subscription.direction.as_str())
        .bind(channels_json)
        .bind(subscription.status.as_str())
        .bind(subscription.created_at.timestamp_millis())
        .bind(subscription.updated_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        insert_outbox(&mut *tx, outbox).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_subscription(
        &self,
        subscription: &Subscription,
        outbox: &OutboxRecord,
    ) -> Result<(), AppError> {
        let channels_json = serde_json::to_string(&subscription.notification_channels)?;
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query(
            r#"
            UPDATE subscriptions
            SET currency_pair = ?, threshold = ?, direction = ?,
                notification_channels = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&subscription.currency_pair)
        .bind(subscription.threshold.to_string())
        .bind(subscription.direction.as_str())
        .bind(channels_json)
        .bind(subscription.status.as_str())
        .bind(subscription.updated_at.timestamp_millis())
        .bind(subscription.id.to_string())
        .execute(&mut *tx)
        .await?;

        insert_outbox(&mut *tx, outbox).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_subscription(&self, id: Uuid, outbox: &OutboxRecord) -> Result<(), AppError> {
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query("DELETE FROM subscriptions WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        insert_outbox(&mut *tx, outbox).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, AppError> {
        let row = sqlx::query("SELECT * FROM subscriptions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.as_ref().map(map_subscription_row).transpose()
    }

    async fn get_subscriptions_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Subscription>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM subscriptions WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.iter().map(map_subscription_row).collect()
    }
}

#[async_trait]
impl OutboxRepository for SqliteRepository {
    async fn insert(&self, record: &OutboxRecord) -> Result<(), AppError> {
        insert_outbox(self.pool.get_pool(), record).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OutboxRecord>, AppError> {
        let row = sqlx::query("SELECT * FROM events_outbox WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.as_ref().map(map_outbox_row).transpose()
    }

    async fn find_by_status(&self, status: OutboxStatus) -> Result<Vec<OutboxRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM events_outbox WHERE status = ? ORDER BY timestamp ASC",
        )
        .bind(status.as_str())
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.iter().map(map_outbox_row).collect()
    }

    async fn update_status(&self, id: Uuid, status: OutboxStatus) -> Result<bool, AppError> {
        // Pending is the only state a record may leave; terminal records
        // never transition again.
        let result = sqlx::query(
            "UPDATE events_outbox SET status = ? WHERE id = ? AND status = 'PENDING'",
        )
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(&self, user: &FxUser) -> Result<(), AppError> {
        sqlx::query("INSERT INTO fx_users (id, email, mobile, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.mobile)
            .bind(user.created_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<FxUser>, AppError> {
        let row = sqlx::query("SELECT * FROM fx_users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => {
                let id: String = row.try_get("id")?;
                let email: String = row.try_get("email")?;
                let mobile: Option<String> = row.try_get("mobile")?;
                let created_at: i64 = row.try_get("created_at")?;

                Ok(Some(FxUser {
                    id: parse_uuid(&id)?,
                    email,
                    mobile,
                    created_at: parse_millis(created_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM fx_users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool.get_pool())
            .await?;
        Ok(row.is_some())
    }
}
