pub mod broker;
pub mod cache;
pub mod repositories;

pub use broker::BrokerClient;
pub use cache::SubscriptionCache;
pub use repositories::{OutboxRepository, SubscriptionRepository, UserRepository};
