pub mod change_publisher;
pub mod outbox_service;
pub mod subscription_service;

pub use change_publisher::SubscriptionChangePublisher;
pub use outbox_service::EventsOutboxService;
pub use subscription_service::SubscriptionService;
