use crate::application::ports::BrokerClient;
use crate::application::services::{
    EventsOutboxService, SubscriptionChangePublisher, SubscriptionService,
};
use crate::infrastructure::cache::SubscriptionCacheService;
use crate::infrastructure::database::{ConnectionPool, SqliteRepository};
use crate::infrastructure::jobs::OutboxDrainJob;
use crate::shared::config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Application composition root. Wires the store, cache, services and the
/// outbox drainer from a single config.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool: ConnectionPool,
    pub subscription_service: Arc<SubscriptionService>,
    pub outbox_service: Arc<EventsOutboxService>,
    pub change_publisher: Arc<SubscriptionChangePublisher>,
    pub drain_job: Arc<OutboxDrainJob>,
}

impl AppState {
    pub async fn new(config: AppConfig, broker: Arc<dyn BrokerClient>) -> anyhow::Result<Self> {
        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;

        let repository = Arc::new(SqliteRepository::new(pool.clone()));
        repository.initialize().await?;

        let cache = Arc::new(SubscriptionCacheService::new(config.cache.ttl_seconds));

        let subscription_service = Arc::new(SubscriptionService::new(
            repository.clone(),
            repository.clone(),
            cache,
        ));
        let outbox_service = Arc::new(EventsOutboxService::new(repository));
        let change_publisher = Arc::new(SubscriptionChangePublisher::new(
            broker,
            outbox_service.clone(),
            config.broker.subscription_changes_topic.clone(),
        ));
        let drain_job = Arc::new(OutboxDrainJob::new(
            outbox_service.clone(),
            change_publisher.clone(),
        ));

        Ok(Self {
            config,
            pool,
            subscription_service,
            outbox_service,
            change_publisher,
            drain_job,
        })
    }

    /// Starts the periodic outbox drainer with the configured schedule.
    pub fn start_outbox_drainer(&self) -> JoinHandle<()> {
        self.drain_job.clone().spawn_periodic(
            Duration::from_millis(self.config.outbox.initial_delay_ms),
            Duration::from_millis(self.config.outbox.check_interval_ms),
        )
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
