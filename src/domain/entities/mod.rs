pub mod change_event;
pub mod outbox;
pub mod subscription;
pub mod user;

pub use change_event::SubscriptionChangeEvent;
pub use outbox::{OutboxEventType, OutboxRecord, OutboxStatus, AGGREGATE_TYPE_SUBSCRIPTION};
pub use subscription::{
    Subscription, SubscriptionCreateRequest, SubscriptionListSnapshot, SubscriptionSnapshot,
    SubscriptionStatus, SubscriptionUpdateRequest, ThresholdDirection,
};
pub use user::FxUser;
