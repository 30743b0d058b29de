//! Sheet Cache - read-through cache in front of a spreadsheet-backed store
//!
//! Runs the ops HTTP API over a single process-wide cache instance.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheet_cache::api::create_router;
use sheet_cache::upstream::{
    HttpRangeStore, HttpRangeStoreConfig, InMemoryRangeStore, RemoteRangeStore,
};
use sheet_cache::{spawn_sweeper_task, AppState, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the upstream range store (in-memory when no URL is set)
/// 4. Create the process-wide cache and start the expiry sweeper
/// 5. Serve the ops API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheet_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sheet Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}ms, sweep_interval={}s, port={}, upstream={}",
        config.ttl.default_ms,
        config.sweep_interval,
        config.server_port,
        config.upstream_url.as_deref().unwrap_or("in-memory")
    );

    let store = build_store(&config)?;
    let state = AppState::from_config(&config, store);
    info!("Cache initialized");

    let sweeper = spawn_sweeper_task(
        state.access.cache().clone(),
        Duration::from_secs(config.sweep_interval),
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn RemoteRangeStore>> {
    match &config.upstream_url {
        Some(url) => {
            let mut http_config = HttpRangeStoreConfig::new(url)
                .with_timeout(Duration::from_secs(config.upstream_timeout));
            if let Some(token) = &config.upstream_token {
                http_config = http_config.with_token(token);
            }
            let store = HttpRangeStore::new(http_config).context("invalid upstream config")?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("UPSTREAM_URL not set, using in-memory range store");
            Ok(Arc::new(InMemoryRangeStore::new()))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweeper.
async fn shutdown_signal(sweeper: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    sweeper.abort();
    warn!("Expiry sweeper aborted");
}
