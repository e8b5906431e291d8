use fx_subscriptions::infrastructure::broker::ChannelBrokerClient;
use fx_subscriptions::{init_logging, AppConfig, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env();
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    info!(
        database_url = %config.database.url,
        topic = %config.broker.subscription_changes_topic,
        check_interval_ms = config.outbox.check_interval_ms,
        "starting outbox drainer"
    );

    let (broker, mut rx) = ChannelBrokerClient::new();
    let state = AppState::new(config, Arc::new(broker)).await?;

    // Downstream consumer stand-in: log every message the drainer publishes.
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            info!(
                target: "broker::consumer",
                topic = %message.topic,
                key = %message.key,
                payload = %message.payload,
                "message delivered"
            );
        }
    });

    let drainer = state.start_outbox_drainer();

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    drainer.abort();
    state.shutdown().await;
    Ok(())
}
