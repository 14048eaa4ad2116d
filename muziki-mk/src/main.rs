//! muziki-mk (Marketplace) - Main entry point
//!
//! HTTP service for purchase recording, stream event recording and
//! sales/streaming analytics.

use anyhow::{Context, Result};
use clap::Parser;
use muziki_common::auth;
use muziki_common::config::ServiceConfig;
use muziki_common::db::init_database;
use muziki_mk::purchase::settlement::SimulatedGateway;
use muziki_mk::{build_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

/// Command-line arguments for muziki-mk
#[derive(Parser, Debug)]
#[command(name = "muziki-mk")]
#[command(about = "Marketplace service for Muziki")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "MUZIKI_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "MUZIKI_MK_PORT")]
    port: Option<u16>,

    /// Database file path (overrides the config file)
    #[arg(short, long, env = "MUZIKI_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Muziki Marketplace (muziki-mk) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config =
        ServiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = Some(database);
    }

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let token_secret = auth::load_or_init_secret(&pool)
        .await
        .context("Failed to load token signing secret")?;
    info!("✓ Loaded token signing secret");

    let gateway = Arc::new(SimulatedGateway::new(Duration::from_millis(
        config.settlement_delay_ms,
    )));
    info!(
        "Settlement: simulated gateway, {}ms latency, {}ms timeout",
        config.settlement_delay_ms, config.settlement_timeout_ms
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(pool, config, token_secret, gateway);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("muziki-mk listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
