//! Firmware metadata service: create, list, inspect, resolve latest.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ota_auth::Capability;
use ota_core::error::AppError;
use ota_core::types::FirmwareId;
use ota_database::FirmwareRepository;
use ota_entity::firmware::{CreateFirmware, FirmwareRecord};
use ota_storage::normalize_declared;

use super::error::FirmwareError;
use crate::context::RequestContext;

/// Metadata for a new release as supplied by an operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFirmware {
    /// Repository the build came from.
    pub repo_name: String,
    /// Commit the build came from.
    pub commit_id: Option<String>,
    /// Target boards.
    pub boards: Vec<String>,
    /// Free text.
    pub description: String,
    /// Digest the binary is expected to have.
    pub expected_digest: Option<String>,
}

/// Firmware record management.
#[derive(Clone)]
pub struct FirmwareService {
    /// Catalog repository.
    repo: Arc<FirmwareRepository>,
}

impl std::fmt::Debug for FirmwareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirmwareService").finish()
    }
}

impl FirmwareService {
    /// Creates a new firmware service.
    pub fn new(repo: Arc<FirmwareRepository>) -> Self {
        Self { repo }
    }

    /// Creates a record in the `Created` state. Operators only.
    pub async fn create_firmware(
        &self,
        ctx: &RequestContext,
        req: NewFirmware,
    ) -> Result<FirmwareRecord, AppError> {
        ctx.require(Capability::Operator)?;

        let repo_name = req.repo_name.trim().to_string();
        if repo_name.is_empty() {
            return Err(FirmwareError::MissingRepoName.into());
        }
        if req.boards.is_empty() {
            return Err(FirmwareError::EmptyBoards.into());
        }
        let expected_digest = req
            .expected_digest
            .as_deref()
            .map(normalize_declared)
            .transpose()?;

        let record = self
            .repo
            .create(&CreateFirmware {
                repo_name,
                commit_id: req.commit_id.filter(|c| !c.trim().is_empty()),
                boards: req.boards,
                description: req.description,
                expected_digest,
                created_by: ctx.subject_name().to_string(),
            })
            .await?;

        info!(
            firmware_id = %record.id,
            repo = %record.repo_name,
            subject = %ctx.subject_name(),
            "Firmware announced"
        );
        Ok(record)
    }

    /// Lists every record, newest first. Operators only.
    pub async fn list_all_firmwares(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<FirmwareRecord>, AppError> {
        ctx.require(Capability::Operator)?;
        self.repo.list_all().await
    }

    /// Fetches one record. Operators only.
    pub async fn get_firmware(
        &self,
        ctx: &RequestContext,
        id: FirmwareId,
    ) -> Result<FirmwareRecord, AppError> {
        ctx.require(Capability::Operator)?;
        self.repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| FirmwareError::NotFound { id }.into())
    }

    /// Newest shipped record of `repo_name` for the calling board.
    ///
    /// The board name is the caller's own subject name, so operator
    /// tokens are rejected.
    pub async fn get_latest_firmware(
        &self,
        ctx: &RequestContext,
        repo_name: &str,
    ) -> Result<Option<FirmwareRecord>, AppError> {
        ctx.require(Capability::Board)?;

        let latest = self
            .repo
            .find_latest_for_board(repo_name, ctx.subject_name())
            .await?;
        debug!(
            repo = %repo_name,
            board = %ctx.subject_name(),
            firmware_id = ?latest.as_ref().map(|r| r.id),
            "Resolved latest firmware"
        );
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ota_core::error::ErrorKind;

    use crate::testing::{Harness, board, new_firmware, operator};

    #[tokio::test]
    async fn test_create_sets_creator_and_created_state() {
        let h = Harness::new().await;
        let fw = h
            .firmware
            .create_firmware(&operator(), new_firmware("r1", &["b1"]))
            .await
            .unwrap();

        assert_eq!(fw.created_by, "ci");
        assert_eq!(fw.size, 0);
        assert!(fw.digest.is_empty());
        assert_eq!(
            h.firmware.get_firmware(&operator(), fw.id).await.unwrap(),
            fw
        );
    }

    #[tokio::test]
    async fn test_create_validates_metadata() {
        let h = Harness::new().await;

        let err = h
            .firmware
            .create_firmware(&operator(), new_firmware("  ", &["b1"]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = h
            .firmware
            .create_firmware(&operator(), new_firmware("r1", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut bad_digest = new_firmware("r1", &["b1"]);
        bad_digest.expected_digest = Some("nope".into());
        let err = h
            .firmware
            .create_firmware(&operator(), bad_digest)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        assert!(h.firmware.list_all_firmwares(&operator()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_board_token_rejected_for_operator_operations() {
        let h = Harness::new().await;
        let b = board("b1");

        let err = h
            .firmware
            .create_firmware(&b, new_firmware("r1", &["b1"]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert_eq!(
            h.firmware.list_all_firmwares(&b).await.unwrap_err().kind,
            ErrorKind::Forbidden
        );
        assert_eq!(
            h.firmware
                .get_firmware(&b, FirmwareId::new())
                .await
                .unwrap_err()
                .kind,
            ErrorKind::Forbidden
        );
    }

    #[tokio::test]
    async fn test_operator_token_rejected_for_latest() {
        let h = Harness::new().await;
        let err = h
            .firmware
            .get_latest_firmware(&operator(), "r1")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let h = Harness::new().await;
        let err = h
            .firmware
            .get_firmware(&operator(), FirmwareId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_latest_is_scoped_to_calling_board() {
        let h = Harness::new().await;
        let fw = h
            .firmware
            .create_firmware(&operator(), new_firmware("r1", &["b1"]))
            .await
            .unwrap();
        h.upload
            .add_firmware_file(&operator(), fw.id, "abc".into(), None)
            .await
            .unwrap();

        let latest = h
            .firmware
            .get_latest_firmware(&board("b1"), "r1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, fw.id);
        assert!(
            h.firmware
                .get_latest_firmware(&board("b2"), "r1")
                .await
                .unwrap()
                .is_none()
        );
    }
}
