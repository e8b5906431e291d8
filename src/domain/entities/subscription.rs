use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which side of the threshold triggers a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThresholdDirection {
    Above,
    Below,
}

impl ThresholdDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdDirection::Above => "ABOVE",
            ThresholdDirection::Below => "BELOW",
        }
    }
}

impl fmt::Display for ThresholdDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ABOVE" => Ok(ThresholdDirection::Above),
            "BELOW" => Ok(ThresholdDirection::Below),
            other => Err(format!("Unknown threshold direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "INACTIVE" => Ok(SubscriptionStatus::Inactive),
            other => Err(format!("Unknown subscription status: {other}")),
        }
    }
}

/// FX rate subscription owned by a single user. Mutated only through
/// `SubscriptionService`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency_pair: String,
    pub threshold: Decimal,
    pub direction: ThresholdDirection,
    pub notification_channels: Vec<String>,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Timestamps are persisted at millisecond precision, so they are captured
/// at that precision to keep stored and in-memory values identical.
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

impl Subscription {
    pub fn new(
        user_id: Uuid,
        currency_pair: String,
        threshold: Decimal,
        direction: ThresholdDirection,
        notification_channels: Vec<String>,
    ) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            user_id,
            currency_pair,
            threshold,
            direction,
            notification_channels,
            status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Partial merge: only fields present in the request overwrite the
    /// current values.
    pub fn apply_update(&mut self, request: &SubscriptionUpdateRequest) {
        if let Some(currency_pair) = &request.currency_pair {
            self.currency_pair = currency_pair.clone();
        }
        if let Some(threshold) = request.threshold {
            self.threshold = threshold;
        }
        if let Some(direction) = request.direction {
            self.direction = direction;
        }
        if let Some(status) = request.status {
            self.status = status;
        }
        if let Some(channels) = &request.notification_channels {
            self.notification_channels = channels.clone();
        }
        self.updated_at = now_millis();
    }

    pub fn snapshot(&self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            id: self.id,
            user_id: self.user_id,
            currency_pair: self.currency_pair.clone(),
            threshold: self.threshold,
            direction: self.direction,
            notification_channels: self.notification_channels.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreateRequest {
    pub currency_pair: String,
    pub threshold: Decimal,
    pub direction: ThresholdDirection,
    #[serde(default)]
    pub notification_channels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdateRequest {
    #[serde(default)]
    pub currency_pair: Option<String>,
    #[serde(default)]
    pub threshold: Option<Decimal>,
    #[serde(default)]
    pub direction: Option<ThresholdDirection>,
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub notification_channels: Option<Vec<String>>,
}

/// Point-in-time externally visible view of a subscription. Used as the
/// outbox payload and as the cached value, so it is captured at write time
/// rather than referencing the live entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency_pair: String,
    pub threshold: Decimal,
    pub direction: ThresholdDirection,
    #[serde(default)]
    pub notification_channels: Vec<String>,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user list snapshot cached alongside its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionListSnapshot {
    pub subscriptions: Vec<SubscriptionSnapshot>,
    pub total_count: usize,
}

impl SubscriptionListSnapshot {
    pub fn from_subscriptions(subscriptions: &[Subscription]) -> Self {
        Self {
            subscriptions: subscriptions.iter().map(Subscription::snapshot).collect(),
            total_count: subscriptions.len(),
        }
    }
}
