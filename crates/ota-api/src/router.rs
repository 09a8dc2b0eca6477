//! Route definitions for the OTA HTTP API.
//!
//! Firmware routes are mounted under `/api/v1`, health under `/api`.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, put},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_size_bytes as usize;
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let v1_routes = Router::new()
        .merge(firmware_routes())
        .merge(binary_routes());

    let api_routes = Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Firmware metadata and upload
fn firmware_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/firmwares",
            get(handlers::firmware::list_firmwares).post(handlers::firmware::create_firmware),
        )
        .route("/firmwares/latest", get(handlers::firmware::get_latest))
        .route("/firmwares/{id}", get(handlers::firmware::get_firmware))
        .route("/firmwares/{id}/binary", put(handlers::firmware::upload_binary))
}

/// Payload download
fn binary_routes() -> Router<AppState> {
    Router::new().route("/bin/{id}", get(handlers::binary::download))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
