//! Shared fixtures for service tests.

use std::sync::Arc;

use ota_auth::TokenSubject;
use ota_core::config::{DatabaseConfig, StorageConfig};
use ota_core::traits::BinaryStore;
use ota_database::migration::run_migrations;
use ota_database::{DatabasePool, FirmwareRepository};
use ota_entity::firmware::FirmwareRecord;
use ota_storage::LocalBinaryStore;
use sqlx::SqlitePool;

use crate::context::RequestContext;
use crate::firmware::{DownloadService, FirmwareService, NewFirmware, UploadService};

pub(crate) struct Harness {
    _dir: tempfile::TempDir,
    pub pool: SqlitePool,
    pub store: Arc<dyn BinaryStore>,
    pub firmware: FirmwareService,
    pub upload: UploadService,
    pub download: DownloadService,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_grace(3600).await
    }

    pub async fn with_grace(orphan_grace_seconds: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabasePool::connect(&DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("catalog.db").display()),
            ..DatabaseConfig::default()
        })
        .await
        .unwrap();
        run_migrations(db.pool()).await.unwrap();

        let storage_config = StorageConfig {
            root_path: dir.path().join("bins").display().to_string(),
            orphan_grace_seconds,
        };
        let store: Arc<dyn BinaryStore> =
            Arc::new(LocalBinaryStore::new(&storage_config.root_path).await.unwrap());
        let pool = db.into_pool();
        let repo = Arc::new(FirmwareRepository::new(pool.clone()));

        Self {
            _dir: dir,
            pool,
            firmware: FirmwareService::new(Arc::clone(&repo)),
            upload: UploadService::new(Arc::clone(&repo), Arc::clone(&store), storage_config),
            download: DownloadService::new(repo, Arc::clone(&store)),
            store,
        }
    }

    pub async fn create(&self, repo: &str, boards: &[&str]) -> FirmwareRecord {
        self.firmware
            .create_firmware(&operator(), new_firmware(repo, boards))
            .await
            .unwrap()
    }
}

pub(crate) fn operator() -> RequestContext {
    RequestContext::local(TokenSubject::operator("ci"))
}

pub(crate) fn board(name: &str) -> RequestContext {
    RequestContext::local(TokenSubject::board(name))
}

pub(crate) fn new_firmware(repo: &str, boards: &[&str]) -> NewFirmware {
    NewFirmware {
        repo_name: repo.to_string(),
        commit_id: Some("deadbeef".to_string()),
        boards: boards.iter().map(|b| b.to_string()).collect(),
        description: "test build".to_string(),
        expected_digest: None,
    }
}
