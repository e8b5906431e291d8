use crate::shared::error::AppError;
use async_trait::async_trait;

/// Async broker send. Resolving the returned future is the delivery
/// acknowledgment; implementations carry their own bounded timeout.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn send(&self, topic: &str, key: &str, payload: String) -> Result<(), AppError>;
}
