//! Binary download resolution.

use std::sync::Arc;

use tracing::debug;

use ota_core::error::AppError;
use ota_core::traits::{BinaryLocation, BinaryStore};
use ota_core::types::FirmwareId;
use ota_database::FirmwareRepository;

use crate::context::RequestContext;

/// Everything the transport layer needs to serve a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Where the payload lives.
    pub location: BinaryLocation,
    /// Payload length in bytes.
    pub size: i64,
    /// Payload digest.
    pub digest: String,
}

/// Translates record ids into binary store locations.
#[derive(Clone)]
pub struct DownloadService {
    /// Catalog repository.
    repo: Arc<FirmwareRepository>,
    /// Binary store.
    store: Arc<dyn BinaryStore>,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(repo: Arc<FirmwareRepository>, store: Arc<dyn BinaryStore>) -> Self {
        Self { repo, store }
    }

    /// Location of the payload for `id`, or `None` unless the record
    /// exists and is shipped. The store is never consulted otherwise.
    pub async fn get_binary_location(
        &self,
        id: FirmwareId,
    ) -> Result<Option<BinaryLocation>, AppError> {
        Ok(self.resolve(id).await?.map(|t| t.location))
    }

    /// Resolves a download for any authenticated caller.
    pub async fn resolve_download(
        &self,
        ctx: &RequestContext,
        id: FirmwareId,
    ) -> Result<Option<DownloadTarget>, AppError> {
        let target = self.resolve(id).await?;
        debug!(
            firmware_id = %id,
            subject = %ctx.subject_name(),
            found = target.is_some(),
            "Resolved download"
        );
        Ok(target)
    }

    async fn resolve(&self, id: FirmwareId) -> Result<Option<DownloadTarget>, AppError> {
        let Some(record) = self.repo.find_by_id(&id).await? else {
            return Ok(None);
        };
        if !record.has_binary() {
            return Ok(None);
        }
        Ok(Some(DownloadTarget {
            location: self.store.location_for(&id),
            size: record.size,
            digest: record.digest,
        }))
    }
}
