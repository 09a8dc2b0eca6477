//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use ota_auth::JwtDecoder;
use ota_core::config::AppConfig;
use ota_core::traits::BinaryStore;
use ota_database::{DatabasePool, FirmwareRepository};
use ota_service::{DownloadService, FirmwareService, UploadService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Catalog connection pool
    pub db: DatabasePool,
    /// Binary store
    pub store: Arc<dyn BinaryStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Firmware metadata service
    pub firmware_service: Arc<FirmwareService>,
    /// Binary upload service
    pub upload_service: Arc<UploadService>,
    /// Binary download service
    pub download_service: Arc<DownloadService>,
}

impl AppState {
    /// Wires repositories and services on top of the given infrastructure.
    pub fn new(config: AppConfig, db: DatabasePool, store: Arc<dyn BinaryStore>) -> Self {
        let firmware_repo = Arc::new(FirmwareRepository::new(db.pool().clone()));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let firmware_service = Arc::new(FirmwareService::new(Arc::clone(&firmware_repo)));
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&firmware_repo),
            Arc::clone(&store),
            config.storage.clone(),
        ));
        let download_service = Arc::new(DownloadService::new(
            Arc::clone(&firmware_repo),
            Arc::clone(&store),
        ));

        Self {
            config: Arc::new(config),
            db,
            store,
            jwt_decoder,
            firmware_service,
            upload_service,
            download_service,
        }
    }

    /// Base URL for download links, without a trailing slash.
    pub fn public_url(&self) -> &str {
        self.config.server.public_url.trim_end_matches('/')
    }
}
