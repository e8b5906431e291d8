use super::subscription::SubscriptionSnapshot;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const AGGREGATE_TYPE_SUBSCRIPTION: &str = "Subscription";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxEventType {
    Created,
    Updated,
    Deleted,
}

impl OutboxEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxEventType::Created => "Created",
            OutboxEventType::Updated => "Updated",
            OutboxEventType::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for OutboxEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboxEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(OutboxEventType::Created),
            "Updated" => Ok(OutboxEventType::Updated),
            "Deleted" => Ok(OutboxEventType::Deleted),
            other => Err(format!("Unknown outbox event type: {other}")),
        }
    }
}

/// Status machine: `Pending` is the only initial state; `Sent` and `Failed`
/// are terminal with no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::Sent => "SENT",
            OutboxStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OutboxStatus::Sent | OutboxStatus::Failed)
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OutboxStatus::Pending),
            "SENT" => Ok(OutboxStatus::Sent),
            "FAILED" => Ok(OutboxStatus::Failed),
            other => Err(format!("Unknown outbox status: {other}")),
        }
    }
}

/// One intended change event, written in the same transaction as the
/// subscription mutation it records. Never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRecord {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: Uuid,
    pub event_type: OutboxEventType,
    pub payload: SubscriptionSnapshot,
    pub status: OutboxStatus,
    /// Creation instant, epoch milliseconds.
    pub timestamp: i64,
}

impl OutboxRecord {
    pub fn for_subscription(event_type: OutboxEventType, payload: SubscriptionSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_type: AGGREGATE_TYPE_SUBSCRIPTION.to_string(),
            aggregate_id: payload.id,
            event_type,
            payload,
            status: OutboxStatus::Pending,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
