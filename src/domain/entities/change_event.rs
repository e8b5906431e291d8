use super::outbox::{OutboxEventType, OutboxRecord};
use super::subscription::SubscriptionSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message published to the broker for one outbox record. Consumers dedupe
/// by `event_id`; delivery is at-least-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionChangeEvent {
    pub event_id: Uuid,
    pub timestamp: i64,
    pub event_type: OutboxEventType,
    pub payload: SubscriptionSnapshot,
}

impl SubscriptionChangeEvent {
    pub fn from_outbox(record: &OutboxRecord) -> Self {
        Self {
            event_id: record.id,
            timestamp: record.timestamp,
            event_type: record.event_type,
            payload: record.payload.clone(),
        }
    }

    /// Broker message key: the subscription id, so all events for one
    /// subscription land on the same partition.
    pub fn key(&self) -> String {
        self.payload.id.to_string()
    }
}
