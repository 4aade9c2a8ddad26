use std::sync::Arc;

use bookstore::api::Router;
use bookstore::config::Config;
use bookstore::server;
use bookstore::store::BookStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let store = Arc::new(BookStore::open(&cfg.database).await?);
    let router = Arc::new(Router::new(Arc::clone(&store), cfg.api_url()));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };

    server::listener::run(&cfg.server, router, shutdown).await?;

    // The listener drains every connection before returning.
    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(_) => tracing::warn!("Store still shared after shutdown; skipping explicit close"),
    }

    Ok(())
}
