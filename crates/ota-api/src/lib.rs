//! # ota-api
//!
//! HTTP API layer for the OTA firmware catalog built on Axum.
//!
//! Provides the REST endpoints, the bearer token extractor, DTOs,
//! middleware (logging, CORS), and the mapping from `AppError` to HTTP
//! responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
