//! Tribal Heritage storefront service

use std::sync::Arc;
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tribal_heritage::api;
use tribal_heritage::config::{AppConfig, StorageBackend};
use tribal_heritage::services::EventPublisher;
use tribal_heritage::store::{PgStore, Repositories};
use tribal_heritage::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let repos = match (&config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            let store = PgStore::connect(database).await?;
            store.migrate().await?;
            tracing::info!(max_connections = database.max_connections, "using postgres store");
            Repositories::from_store(Arc::new(store))
        }
        _ => {
            tracing::warn!("using in-memory store; data is lost on restart");
            Repositories::in_memory()
        }
    };
    let events = EventPublisher::connect(config.nats_url.as_deref()).await;
    let state = AppState::new(&config, repos, events);
    let app = api::router(state);

    let addr = config.socket_addr();
    tracing::info!(%addr, "{} listening", api::SERVICE_NAME);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
