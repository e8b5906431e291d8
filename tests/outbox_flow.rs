use fx_subscriptions::application::ports::repositories::UserRepository;
use fx_subscriptions::domain::entities::{
    FxUser, OutboxEventType, OutboxStatus, SubscriptionCreateRequest, ThresholdDirection,
};
use fx_subscriptions::infrastructure::broker::{BrokerMessage, ChannelBrokerClient};
use fx_subscriptions::infrastructure::database::SqliteRepository;
use fx_subscriptions::shared::config::AppConfig;
use fx_subscriptions::{AppError, AppState};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

async fn setup() -> (AppState, UnboundedReceiver<BrokerMessage>, tempfile::TempDir) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let mut config = AppConfig::default();
    config.database.url = format!("sqlite:{}?mode=rwc", db_path.display());
    config.outbox.initial_delay_ms = 10;
    config.outbox.check_interval_ms = 25;

    let (broker, rx) = ChannelBrokerClient::new();
    let state = AppState::new(config, Arc::new(broker)).await.unwrap();

    (state, rx, temp_dir)
}

async fn seed_user(state: &AppState) -> FxUser {
    let repository = SqliteRepository::new(state.pool.clone());
    let user = FxUser::new(
        "trader@example.com".to_string(),
        Some("+441234567890".to_string()),
    );
    repository.create_user(&user).await.unwrap();
    user
}

fn create_request() -> SubscriptionCreateRequest {
    SubscriptionCreateRequest {
        currency_pair: "GBP/USD".to_string(),
        threshold: Decimal::from_str("1.25").unwrap(),
        direction: ThresholdDirection::Above,
        notification_channels: vec!["email".to_string(), "sms".to_string()],
    }
}

async fn wait_until_sent(state: &AppState, outbox_id: Uuid) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let record = state
            .outbox_service
            .find_outbox_by_id(outbox_id)
            .await
            .unwrap();
        if record.status == OutboxStatus::Sent {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "outbox record never reached Sent"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn created_subscription_is_drained_and_published() {
    let (state, mut rx, _dir) = setup().await;
    let user = seed_user(&state).await;

    let subscription = state
        .subscription_service
        .create_subscription(&user.id.to_string(), create_request())
        .await
        .unwrap();

    let pending = state.outbox_service.find_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].aggregate_id, subscription.id);
    assert_eq!(pending[0].event_type, OutboxEventType::Created);

    let drainer = state.start_outbox_drainer();
    wait_until_sent(&state, pending[0].id).await;

    let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    drainer.abort();

    assert_eq!(message.topic, "fx-subscription-changes");
    assert_eq!(message.key, subscription.id.to_string());

    let json: serde_json::Value = serde_json::from_str(&message.payload).unwrap();
    assert_eq!(json["eventId"], pending[0].id.to_string().as_str());
    assert_eq!(json["eventType"], "Created");
    assert_eq!(json["payload"]["id"], subscription.id.to_string().as_str());
    assert_eq!(json["payload"]["userId"], user.id.to_string().as_str());
    assert_eq!(json["payload"]["currencyPair"], "GBP/USD");
    assert_eq!(json["payload"]["threshold"], "1.25");
    assert_eq!(json["payload"]["direction"], "ABOVE");
    assert_eq!(json["payload"]["status"], "ACTIVE");
    assert_eq!(
        json["payload"]["notificationChannels"],
        serde_json::json!(["email", "sms"])
    );

    // A second drain tick must not republish the sent record.
    let pending = state.outbox_service.find_pending().await.unwrap();
    assert!(pending.is_empty());
    state.shutdown().await;
}

#[tokio::test]
async fn update_and_delete_each_leave_one_more_outbox_record() {
    let (state, mut rx, _dir) = setup().await;
    let user = seed_user(&state).await;

    let subscription = state
        .subscription_service
        .create_subscription(&user.id.to_string(), create_request())
        .await
        .unwrap();
    let id = subscription.id.to_string();

    let mut update = fx_subscriptions::domain::entities::SubscriptionUpdateRequest::default();
    update.threshold = Some(Decimal::from_str("1.30").unwrap());
    state
        .subscription_service
        .update_subscription(&id, update)
        .await
        .unwrap();

    state
        .subscription_service
        .delete_subscription(&id)
        .await
        .unwrap();

    // Deleting the subscription does not delete its outbox trail.
    let pending = state.outbox_service.find_pending().await.unwrap();
    assert_eq!(pending.len(), 3);

    let drainer = state.start_outbox_drainer();
    for record in &pending {
        wait_until_sent(&state, record.id).await;
    }
    drainer.abort();

    // Delivery is at-least-once; dedupe by event id the way a consumer would.
    let mut events = std::collections::BTreeMap::new();
    while let Ok(Some(message)) =
        tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
    {
        let json: serde_json::Value = serde_json::from_str(&message.payload).unwrap();
        events.insert(
            json["eventId"].as_str().unwrap().to_string(),
            json["eventType"].as_str().unwrap().to_string(),
        );
    }
    let mut event_types: Vec<String> = events.into_values().collect();
    event_types.sort();
    assert_eq!(event_types, vec!["Created", "Deleted", "Updated"]);
    state.shutdown().await;
}

#[tokio::test]
async fn deleting_a_missing_subscription_changes_nothing() {
    let (state, _rx, _dir) = setup().await;
    seed_user(&state).await;

    let err = state
        .subscription_service
        .delete_subscription(&Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let pending = state.outbox_service.find_pending().await.unwrap();
    assert!(pending.is_empty());
    state.shutdown().await;
}

#[tokio::test]
async fn read_paths_serve_the_created_subscription() {
    let (state, _rx, _dir) = setup().await;
    let user = seed_user(&state).await;

    let subscription = state
        .subscription_service
        .create_subscription(&user.id.to_string(), create_request())
        .await
        .unwrap();

    let found = state
        .subscription_service
        .find_subscription_by_id(&subscription.id.to_string())
        .await
        .unwrap();
    assert_eq!(found, subscription.snapshot());

    let list = state
        .subscription_service
        .find_subscriptions_by_user(&user.id.to_string())
        .await
        .unwrap();
    assert_eq!(list.total_count, 1);
    assert_eq!(list.subscriptions[0].id, subscription.id);
    state.shutdown().await;
}
