//! NFT Sync Cache sidecar
//!
//! Serves the cache and sync layer over HTTP and runs its background tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nft_sync_cache::prefs::PreferenceStore;
use nft_sync_cache::rpc::RpcClient;
use nft_sync_cache::{
    create_router, spawn_cleanup_task, spawn_flush_task, spawn_relay_task, AppState, Config,
};

/// # Startup Sequence
/// 1. Initialize tracing
/// 2. Load configuration, then let persisted preferences override the RPC endpoint
/// 3. Build the shared cache, state sync, batch and queue services
/// 4. Start cleanup, flush and relay tasks
/// 5. Serve until SIGINT/SIGTERM, then flush pending state and persist the sync time
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nft_sync_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting NFT Sync Cache sidecar");

    let mut config = Config::from_env();
    let mut prefs = PreferenceStore::load(&config.prefs_path);
    if let Some(endpoint) = prefs.get().rpc_endpoint.clone() {
        info!("Using RPC endpoint from preferences: {}", endpoint);
        config.rpc_endpoint = endpoint;
    }
    info!(
        "Configuration loaded: max_size={}B, default_ttl={}ms, compression={}, sync_batch={}, port={}",
        config.max_size_bytes,
        config.default_ttl_ms,
        config.compression_enabled,
        config.sync_batch_size,
        config.server_port
    );

    let state = AppState::from_config(&config);
    let relay = Arc::new(RpcClient::new(config.rpc_endpoint.clone()));

    let tasks = vec![
        spawn_cleanup_task(state.cache.clone(), config.cleanup_interval),
        spawn_flush_task(state.state.clone(), config.sync_flush_interval_ms),
        spawn_relay_task(
            Arc::clone(&state.tx_queue),
            relay,
            config.tx_poll_interval_ms,
            config.tx_max_retries,
        ),
    ];
    info!("Background tasks started");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tasks))
        .await
        .context("server error")?;

    let flushed = state.state.flush().await;
    info!("Flushed {} pending state updates on shutdown", flushed);

    if let Err(e) = state.batch.flush().await {
        error!("Final batch commit failed: {}", e);
    }

    if let Some(ts) = state.state.last_sync_ms() {
        prefs.set_last_sync(ts);
    }
    if let Err(e) = prefs.save() {
        warn!("Could not save preferences: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then aborts the background tasks.
async fn shutdown_signal(tasks: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for task in tasks {
        task.abort();
    }
    warn!("Background tasks aborted");
}
