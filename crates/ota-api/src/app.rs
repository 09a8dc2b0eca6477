//! Application builder: wires router, middleware, and state into an Axum app.

use std::sync::Arc;

use axum::Router;
use tracing::{error, info};

use ota_core::config::AppConfig;
use ota_core::error::AppError;
use ota_core::traits::BinaryStore;
use ota_database::DatabasePool;
use ota_database::migration::run_migrations;
use ota_storage::LocalBinaryStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the OTA server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting OTA firmware server...");

    // ── Step 1: Catalog ──────────────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;

    // ── Step 2: Binary store ─────────────────────────────────────
    let store: Arc<dyn BinaryStore> =
        Arc::new(LocalBinaryStore::new(&config.storage.root_path).await?);

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let app = build_app(AppState::new(config, db.clone(), store));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("OTA server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    info!("OTA server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
