//! F1 MCP Server - Formula 1 data tools over HTTP
//!
//! Serves live timing, historic results and telemetry from the OpenF1 and
//! Ergast APIs, with a TTL response cache and per-client rate limiting.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use f1_mcp_server::api::{create_router, AppState};
use f1_mcp_server::clock::{Clock, SystemClock};
use f1_mcp_server::tasks::{spawn_reaper, ReaperHandle};
use f1_mcp_server::upstream::HttpFetcher;
use f1_mcp_server::Config;

/// Main entry point for the F1 data server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the data service, response cache and rate limiter
/// 4. Start one background reaper per store
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Stop the reapers on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "f1_mcp_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting F1 MCP Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, live_ttl={}s, rate_limit={}/{}ms, port={}, reaper_interval={}ms",
        config.default_ttl,
        config.live_ttl,
        config.rate_limit_max_requests,
        config.rate_limit_window_ms,
        config.server_port,
        config.reaper_interval_ms
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let fetcher = HttpFetcher::new(config.upstream_timeout())?;
    let state = AppState::from_config(&config, Arc::new(fetcher), clock);
    info!("Data service initialized");

    let reapers = vec![
        spawn_reaper(state.service.cache(), config.reaper_interval()),
        spawn_reaper(state.limiter.clone(), config.reaper_interval()),
    ];

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    stop_reapers(reapers).await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
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
}

async fn stop_reapers(reapers: Vec<ReaperHandle>) {
    for reaper in reapers {
        let name = reaper.name();
        reaper.shutdown().await;
        warn!("{} reaper stopped", name);
    }
}
