use crate::application::services::{EventsOutboxService, SubscriptionChangePublisher};
use crate::domain::entities::SubscriptionChangeEvent;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Periodic drainer for the events outbox. Each tick queries the pending
/// records and dispatches one publish task per record without awaiting it,
/// so a slow or failing publish cannot hold up the rest of the tick.
/// Exactly one drainer instance is assumed to be active; no row claiming
/// is performed.
pub struct OutboxDrainJob {
    outbox: Arc<EventsOutboxService>,
    publisher: Arc<SubscriptionChangePublisher>,
}

#[derive(Debug, Clone, Copy)]
pub struct DrainRunStats {
    pub pending_records: u64,
    pub dispatched: u64,
}

impl OutboxDrainJob {
    pub fn new(outbox: Arc<EventsOutboxService>, publisher: Arc<SubscriptionChangePublisher>) -> Self {
        Self { outbox, publisher }
    }

    /// One drain tick. The pending query runs in its own short-lived scope;
    /// no transaction spans the broker round-trips.
    pub async fn run_once(&self) -> Result<DrainRunStats, AppError> {
        let started = Instant::now();
        let pending = self.outbox.find_pending().await?;
        let pending_records = pending.len() as u64;

        let mut dispatched = 0u64;
        for record in &pending {
            let event = SubscriptionChangeEvent::from_outbox(record);
            let publisher = Arc::clone(&self.publisher);

            // Fire-and-forget fan-out; the publish outcome lands on the
            // outbox record from the spawned task.
            tokio::spawn(async move {
                let event_id = event.event_id;
                if let Err(e) = publisher.publish(event).await {
                    tracing::error!(
                        target: "outbox::drain",
                        event_id = %event_id,
                        error = %e,
                        "failed to record publish outcome"
                    );
                }
            });
            dispatched += 1;
        }

        let duration_ms = started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;
        tracing::info!(
            target: "outbox::drain",
            pending_records,
            dispatched,
            duration_ms,
            "outbox drain tick completed"
        );

        Ok(DrainRunStats {
            pending_records,
            dispatched,
        })
    }

    /// Runs drain ticks forever on a fixed period after an initial delay.
    pub fn spawn_periodic(
        self: Arc<Self>,
        initial_delay: Duration,
        period: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + initial_delay;
            let mut interval = tokio::time::interval_at(start, period);

            loop {
                interval.tick().await;
                if let Err(e) = self.run_once().await {
                    // A failed tick is retried implicitly on the next one.
                    tracing::error!(target: "outbox::drain", error = %e, "outbox drain tick failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::broker::BrokerClient;
    use crate::application::ports::repositories::OutboxRepository as OutboxPort;
    use crate::domain::entities::{
        OutboxEventType, OutboxRecord, OutboxStatus, Subscription, ThresholdDirection,
    };
    use async_trait::async_trait;
    use mockall::mock;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    mock! {
        pub OutboxRepo {}

        #[async_trait]
        impl OutboxPort for OutboxRepo {
            async fn insert(&self, record: &OutboxRecord) -> Result<(), AppError>;
            async fn find_by_id(&self, id: Uuid) -> Result<Option<OutboxRecord>, AppError>;
            async fn find_by_status(
                &self,
                status: OutboxStatus,
            ) -> Result<Vec<OutboxRecord>, AppError>;
            async fn update_status(&self, id: Uuid, status: OutboxStatus) -> Result<bool, AppError>;
        }
    }

    struct CountingBroker {
        sends: AtomicUsize,
        fail: bool,
    }

    impl CountingBroker {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sends: AtomicUsize::new(0),
                fail,
            })
        }

        fn send_count(&self) -> usize {
            self.sends.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BrokerClient for CountingBroker {
        async fn send(&self, _topic: &str, _key: &str, _payload: String) -> Result<(), AppError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::Broker("simulated broker outage".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn pending_record() -> OutboxRecord {
        let snapshot = Subscription::new(
            Uuid::new_v4(),
            "GBP/USD".to_string(),
            Decimal::new(125, 2),
            ThresholdDirection::Above,
            vec!["email".to_string()],
        )
        .snapshot();
        OutboxRecord::for_subscription(OutboxEventType::Created, snapshot)
    }

    fn job(repo: MockOutboxRepo, broker: Arc<CountingBroker>) -> OutboxDrainJob {
        let outbox = Arc::new(EventsOutboxService::new(Arc::new(repo)));
        let publisher = Arc::new(SubscriptionChangePublisher::new(
            broker,
            Arc::clone(&outbox),
            "fx-subscription-changes".to_string(),
        ));
        OutboxDrainJob::new(outbox, publisher)
    }

    async fn wait_for(broker: &CountingBroker, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while broker.send_count() < expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {expected} sends"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn empty_outbox_tick_performs_zero_publishes() {
        let mut repo = MockOutboxRepo::new();
        repo.expect_find_by_status().returning(|_| Ok(vec![]));

        let broker = CountingBroker::new(false);
        let job = job(repo, Arc::clone(&broker));

        let stats = job.run_once().await.unwrap();
        assert_eq!(stats.pending_records, 0);
        assert_eq!(stats.dispatched, 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(broker.send_count(), 0);
    }

    #[tokio::test]
    async fn tick_dispatches_every_pending_record_and_marks_sent() {
        let records = vec![pending_record(), pending_record(), pending_record()];
        let record_ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();

        let mut repo = MockOutboxRepo::new();
        {
            let records = records.clone();
            repo.expect_find_by_status()
                .returning(move |_| Ok(records.clone()));
        }
        repo.expect_update_status()
            .withf(move |id, status| record_ids.contains(id) && *status == OutboxStatus::Sent)
            .times(3)
            .returning(|_, _| Ok(true));

        let broker = CountingBroker::new(false);
        let job = job(repo, Arc::clone(&broker));

        let stats = job.run_once().await.unwrap();
        assert_eq!(stats.pending_records, 3);
        assert_eq!(stats.dispatched, 3);

        wait_for(&broker, 3).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn one_failing_record_does_not_stop_the_others() {
        let records = vec![pending_record(), pending_record()];

        let mut repo = MockOutboxRepo::new();
        {
            let records = records.clone();
            repo.expect_find_by_status()
                .returning(move |_| Ok(records.clone()));
        }
        // Every record fails at the broker, each is still attempted and
        // recorded as Failed.
        repo.expect_update_status()
            .withf(|_, status| *status == OutboxStatus::Failed)
            .times(2)
            .returning(|_, _| Ok(true));

        let broker = CountingBroker::new(true);
        let job = job(repo, Arc::clone(&broker));

        let stats = job.run_once().await.unwrap();
        assert_eq!(stats.dispatched, 2);

        wait_for(&broker, 2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn periodic_loop_keeps_ticking() {
        let mut repo = MockOutboxRepo::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        {
            let ticks = Arc::clone(&ticks);
            repo.expect_find_by_status().returning(move |_| {
                ticks.fetch_add(1, Ordering::SeqCst);
                Ok(vec![])
            });
        }

        let broker = CountingBroker::new(false);
        let job = Arc::new(job(repo, broker));
        let handle = job.spawn_periodic(Duration::from_millis(1), Duration::from_millis(10));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while ticks.load(Ordering::SeqCst) < 3 {
            assert!(tokio::time::Instant::now() < deadline, "drainer never ticked");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        handle.abort();
    }
}
