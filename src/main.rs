//! Bootible Edge - Verified script mirror
//!
//! Serves provisioning scripts mirrored from upstream, verified against a
//! pinned SHA-256 digest, with stale fallback when origin misbehaves.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bootible_edge::api::create_router;
use bootible_edge::cache::MemoryStore;
use bootible_edge::routes::RouteTable;
use bootible_edge::{spawn_prune_task, AppState, Config};

/// Main entry point for the script mirror.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Load the route table
/// 4. Create the cache store and start the prune task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bootible_edge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bootible edge mirror");

    let config = Config::from_env().context("loading configuration")?;
    info!(
        "Configuration loaded: upstream={}, fresh_ttl={}s, stale_ttl={}s, fetch_timeout={}ms, port={}",
        config.upstream_base,
        config.fresh_ttl,
        config.stale_ttl,
        config.fetch_timeout_ms,
        config.server_port
    );

    let routes = RouteTable::load(&config.routes_file).context("loading route table")?;
    for key in routes.keys() {
        info!(route = key, "Mirroring route");
    }

    let store = Arc::new(MemoryStore::new());
    let prune_handle = spawn_prune_task(
        store.clone(),
        Duration::from_secs(config.stale_ttl),
        Duration::from_secs(config.prune_interval),
    );

    let state = AppState::from_config(&config, routes, store).context("building app state")?;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(prune_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the prune task and allows graceful shutdown.
async fn shutdown_signal(prune_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    prune_handle.abort();
    warn!("Prune task aborted");
}
