use super::outbox_service::EventsOutboxService;
use crate::application::ports::BrokerClient;
use crate::domain::entities::{OutboxStatus, SubscriptionChangeEvent};
use crate::shared::error::AppError;
use std::sync::Arc;

/// Sends change events to the broker and records the delivery outcome on
/// the corresponding outbox record. Broker failure is terminal for the
/// record (`Failed`, no retry) and is never surfaced to the mutation path;
/// only store failures propagate as errors.
pub struct SubscriptionChangePublisher {
    broker: Arc<dyn BrokerClient>,
    outbox: Arc<EventsOutboxService>,
    topic: String,
}

impl SubscriptionChangePublisher {
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        outbox: Arc<EventsOutboxService>,
        topic: String,
    ) -> Self {
        Self {
            broker,
            outbox,
            topic,
        }
    }

    /// Publishes one event and returns the status that was recorded for it.
    pub async fn publish(&self, event: SubscriptionChangeEvent) -> Result<OutboxStatus, AppError> {
        let key = event.key();
        let payload = serde_json::to_string(&event)?;

        match self.broker.send(&self.topic, &key, payload).await {
            Ok(()) => {
                tracing::info!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    subscription_id = %key,
                    topic = %self.topic,
                    "change event published"
                );
                self.outbox
                    .update_outbox_status(event.event_id, OutboxStatus::Sent)
                    .await?;
                Ok(OutboxStatus::Sent)
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.event_id,
                    subscription_id = %key,
                    topic = %self.topic,
                    error = %e,
                    "unable to publish change event"
                );
                self.outbox
                    .update_outbox_status(event.event_id, OutboxStatus::Failed)
                    .await?;
                Ok(OutboxStatus::Failed)
            }
        }
    }
}
