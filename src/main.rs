mod bot;
mod config;
mod database;
mod error;
mod utils;

use anyhow::{Context, Result};
use config::Config;
use database::ReputationStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utils::reputation::ReputationService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "repbot=info,poise=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;

    let pool = database::create_connection(&config.database_url, config.store_timeout).await?;
    let store = ReputationStore::new(pool, config.store_timeout);
    let pool = store.pool().clone();
    let service = ReputationService::new(store, config.rank_limit);

    // Create and start the bot
    let mut client = bot::create_bot(config, service).await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, disconnecting...");
        shard_manager.shutdown_all().await;
    });

    tracing::info!("Bot is now running. Press CTRL+C to exit.");

    let session = client.start().await;

    drop(client);
    pool.close().await;
    tracing::info!("Database connection closed");

    session.context("Discord session failed")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
