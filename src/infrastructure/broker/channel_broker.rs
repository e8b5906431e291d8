use super::error::BrokerError;
use crate::application::ports::BrokerClient;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One message as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerMessage {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

/// In-process broker transport over an unbounded channel. Stands behind the
/// `BrokerClient` port where a real broker producer would go; the receiver
/// side plays the downstream consumer.
pub struct ChannelBrokerClient {
    tx: mpsc::UnboundedSender<BrokerMessage>,
}

impl ChannelBrokerClient {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BrokerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl BrokerClient for ChannelBrokerClient {
    async fn send(&self, topic: &str, key: &str, payload: String) -> Result<(), AppError> {
        self.tx
            .send(BrokerMessage {
                topic: topic.to_string(),
                key: key.to_string(),
                payload,
            })
            .map_err(|_| BrokerError::Disconnected)?;
        Ok(())
    }
}
