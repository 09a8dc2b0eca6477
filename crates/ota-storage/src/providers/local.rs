//! Local filesystem binary store.
//!
//! Payloads live at `<root>/<id>.bin`. Writes are staged under
//! `<root>/.staging` and published with a hard link, which fails when the
//! target already exists, so a payload appears complete or not at all and
//! is never replaced.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ota_core::error::{AppError, ErrorKind};
use ota_core::result::AppResult;
use ota_core::traits::{BinaryLocation, BinaryStore, ByteStream, StoredBinary, WriteOutcome};
use ota_core::types::FirmwareId;

const PAYLOAD_EXTENSION: &str = "bin";
const STAGING_DIR: &str = ".staging";

/// Local filesystem binary store.
#[derive(Debug, Clone)]
pub struct LocalBinaryStore {
    /// Directory holding published payloads.
    root: PathBuf,
    /// Directory holding in-flight writes.
    staging: PathBuf,
}

impl LocalBinaryStore {
    /// Create a store rooted at the given path, creating directories as needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        let staging = root.join(STAGING_DIR);
        fs::create_dir_all(&staging).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        info!(root = %root.display(), "Local binary store ready");
        Ok(Self { root, staging })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn payload_path(&self, id: &FirmwareId) -> PathBuf {
        self.root.join(format!("{id}.{PAYLOAD_EXTENSION}"))
    }

    fn staging_path(&self, id: &FirmwareId) -> PathBuf {
        self.staging
            .join(format!("{id}.{}.part", Uuid::new_v4().simple()))
    }

    async fn stage(&self, path: &Path, data: &[u8]) -> AppResult<()> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create staging file: {}", path.display()),
                e,
            )
        })?;
        file.write_all(data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to write staging file", e)
        })?;
        file.sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to sync staging file", e))?;
        Ok(())
    }

    async fn discard_staged(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove staging file");
        }
    }
}

fn not_found_or_storage(e: std::io::Error, id: &FirmwareId, action: &str) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Binary not found: {id}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action} binary: {id}"), e)
    }
}

#[async_trait]
impl BinaryStore for LocalBinaryStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir() && self.staging.is_dir())
    }

    async fn write_once(&self, id: &FirmwareId, data: Bytes) -> AppResult<WriteOutcome> {
        let target = self.payload_path(id);
        if fs::try_exists(&target).await.unwrap_or(false) {
            debug!(firmware_id = %id, "Payload already present, skipping write");
            return Ok(WriteOutcome::AlreadyExists);
        }

        let staged = self.staging_path(id);
        if let Err(e) = self.stage(&staged, &data).await {
            Self::discard_staged(&staged).await;
            return Err(e);
        }

        let published = fs::hard_link(&staged, &target).await;
        Self::discard_staged(&staged).await;

        match published {
            Ok(()) => {
                debug!(firmware_id = %id, bytes = data.len(), "Published payload");
                Ok(WriteOutcome::Created)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(firmware_id = %id, "Lost publish race, payload already present");
                Ok(WriteOutcome::AlreadyExists)
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to publish binary: {id}"),
                e,
            )),
        }
    }

    async fn read_bytes(&self, id: &FirmwareId) -> AppResult<Bytes> {
        let data = fs::read(self.payload_path(id))
            .await
            .map_err(|e| not_found_or_storage(e, id, "read"))?;
        Ok(Bytes::from(data))
    }

    async fn read(&self, id: &FirmwareId) -> AppResult<ByteStream> {
        let file = fs::File::open(self.payload_path(id))
            .await
            .map_err(|e| not_found_or_storage(e, id, "open"))?;
        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn exists(&self, id: &FirmwareId) -> AppResult<bool> {
        fs::try_exists(self.payload_path(id)).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to stat binary: {id}"), e)
        })
    }

    async fn delete(&self, id: &FirmwareId) -> AppResult<()> {
        match fs::remove_file(self.payload_path(id)).await {
            Ok(()) => {
                debug!(firmware_id = %id, "Deleted payload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete binary: {id}"),
                e,
            )),
        }
    }

    fn location_for(&self, id: &FirmwareId) -> BinaryLocation {
        BinaryLocation::LocalFile(self.payload_path(id))
    }

    async fn list(&self) -> AppResult<Vec<StoredBinary>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list storage root", e)
        })?;

        let mut binaries = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PAYLOAD_EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<FirmwareId>().ok())
            else {
                continue;
            };
            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read metadata", e)
            })?;
            if !meta.is_file() {
                continue;
            }
            let modified_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            binaries.push(StoredBinary {
                id,
                size_bytes: meta.len(),
                modified_at,
            });
        }

        binaries.sort_by_key(|b| b.id);
        Ok(binaries)
    }

    async fn purge_staging(&self, older_than: DateTime<Utc>) -> AppResult<usize> {
        let mut entries = fs::read_dir(&self.staging).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list staging directory", e)
        })?;

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let Ok(modified) = meta.modified() else {
                continue;
            };
            if !meta.is_file() || DateTime::<Utc>::from(modified) >= older_than {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to purge staging file"),
            }
        }

        if removed > 0 {
            info!(removed, "Purged stale staging files");
        }
        Ok(removed)
    }
}
