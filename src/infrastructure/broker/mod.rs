pub mod channel_broker;
pub mod error;

pub use channel_broker::{BrokerMessage, ChannelBrokerClient};
pub use error::BrokerError;
