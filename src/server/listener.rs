use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::api::Router;
use crate::config::ServerConfig;
use crate::http::connection::Connection;

/// How long in-flight requests get to finish once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub async fn run<F>(cfg: &ServerConfig, router: Arc<Router>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Bookstore API listening on {}", cfg.listen_addr);
    serve(listener, router, shutdown).await
}

/// Accept loop over an already bound listener. Each connection runs on its own task.
///
/// When `shutdown` resolves the loop stops accepting, idle connections close,
/// and busy ones get `SHUTDOWN_GRACE` to finish before being aborted. On return
/// no connection task holds the router any more.
pub async fn serve<F>(listener: TcpListener, router: Arc<Router>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = accepted?;
                tracing::debug!("Accepted connection from {}", peer);

                let mut conn = Connection::new(socket, Arc::clone(&router), stop_rx.clone());
                connections.spawn(async move {
                    if let Err(e) = conn.run().await {
                        tracing::error!("Connection error from {}: {}", peer, e);
                    }
                });
            }

            // Reap finished tasks so the set does not grow without bound.
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Connection task failed: {}", e);
                }
            }

            _ = &mut shutdown => break,
        }
    }

    drop(listener);
    let _ = stop_tx.send(true);
    info!(open = connections.len(), "Draining connections");

    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        warn!(open = connections.len(), "Aborting connections still busy after grace period");
        connections.shutdown().await;
    }

    Ok(())
}
