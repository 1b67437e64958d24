mod api;
mod config;
mod errors;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::handlers::{build_error_view, AppStateInner};
use api::routes::create_router;
use config::Config;

/// Wait for SIGTERM, SIGINT, or a handler returning a shutdown error
async fn shutdown_signal(requested: Arc<Notify>) {
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
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
        _ = requested.notified() => {
            info!("Shutdown requested by request handler");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,error_view=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Error View Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    // Status registry is filled here and read-only afterwards
    let registry = config
        .status_registry()
        .context("Failed to build status registry")?;
    info!(
        overrides = registry.len(),
        "Error status registry initialized"
    );

    let state = Arc::new(AppStateInner::new(build_error_view(registry)));
    let shutdown = state.shutdown.clone();

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.server_address();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
