use crate::application::ports::OutboxRepository;
use crate::domain::entities::{OutboxRecord, OutboxStatus};
use crate::shared::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Read/update surface over the outbox store. Inserts happen inside the
/// subscription mutation transaction, not here.
pub struct EventsOutboxService {
    outbox: Arc<dyn OutboxRepository>,
}

impl EventsOutboxService {
    pub fn new(outbox: Arc<dyn OutboxRepository>) -> Self {
        Self { outbox }
    }

    pub async fn find_outbox_by_id(&self, id: Uuid) -> Result<OutboxRecord, AppError> {
        self.outbox
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Outbox record not found with id: {id}")))
    }

    pub async fn find_pending(&self) -> Result<Vec<OutboxRecord>, AppError> {
        self.outbox.find_by_status(OutboxStatus::Pending).await
    }

    /// Guarded transition out of `Pending`. Updating a record that has
    /// already reached a terminal status is reported but not an error: the
    /// drainer may republish a record whose earlier acknowledgment raced
    /// the status update.
    pub async fn update_outbox_status(
        &self,
        id: Uuid,
        status: OutboxStatus,
    ) -> Result<bool, AppError> {
        let updated = self.outbox.update_status(id, status).await?;
        if !updated {
            tracing::warn!(
                outbox_id = %id,
                requested_status = %status,
                "outbox record was not pending; status left unchanged"
            );
        }
        Ok(updated)
    }
}
