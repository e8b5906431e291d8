pub mod ports;
pub mod services;

pub use services::{EventsOutboxService, SubscriptionChangePublisher, SubscriptionService};
