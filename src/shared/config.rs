use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub outbox: OutboxConfig,
    pub broker: BrokerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    /// Delay before the first drain tick, in milliseconds.
    pub initial_delay_ms: u64,
    /// Fixed period between drain ticks, in milliseconds.
    pub check_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub endpoint: String,
    pub subscription_changes_topic: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/fx_subscriptions.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            cache: CacheConfig { ttl_seconds: 600 },
            outbox: OutboxConfig {
                initial_delay_ms: 30,
                check_interval_ms: 30_000,
            },
            broker: BrokerConfig {
                endpoint: "localhost:9092".to_string(),
                subscription_changes_topic: "fx-subscription-changes".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("FXSUB_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("FXSUB_DATABASE_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("FXSUB_CACHE_TTL_SECONDS") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.ttl_seconds = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("FXSUB_OUTBOX_INITIAL_DELAY_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.outbox.initial_delay_ms = value;
            }
        }
        if let Ok(v) = std::env::var("FXSUB_OUTBOX_CHECK_INTERVAL_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.outbox.check_interval_ms = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("FXSUB_BROKER_ENDPOINT") {
            if !v.trim().is_empty() {
                cfg.broker.endpoint = v;
            }
        }
        if let Ok(v) = std::env::var("FXSUB_BROKER_TOPIC") {
            if !v.trim().is_empty() {
                cfg.broker.subscription_changes_topic = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.cache.ttl_seconds == 0 {
            return Err("Cache ttl_seconds must be greater than 0".to_string());
        }
        if self.outbox.check_interval_ms == 0 {
            return Err("Outbox check_interval_ms must be greater than 0".to_string());
        }
        if self.broker.subscription_changes_topic.trim().is_empty() {
            return Err("Broker subscription_changes_topic must not be empty".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
