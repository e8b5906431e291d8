use crate::shared::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Broker transport is disconnected")]
    Disconnected,

    #[error("Failed to send message: {0}")]
    SendFailed(String),
}

impl From<BrokerError> for AppError {
    fn from(err: BrokerError) -> Self {
        AppError::Broker(err.to_string())
    }
}
