pub mod memory_cache;
pub mod subscription_cache;

pub use memory_cache::MemoryCacheService;
pub use subscription_cache::SubscriptionCacheService;
