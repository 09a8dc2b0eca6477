//! Domain errors of the firmware lifecycle.

use ota_core::error::AppError;
use ota_core::types::FirmwareId;
use ota_storage::DigestMismatch;
use thiserror::Error;

/// Errors raised by the firmware services before touching any medium.
#[derive(Debug, Error)]
pub enum FirmwareError {
    /// No record with this id.
    #[error("Firmware {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: FirmwareId,
    },

    /// The record already has a binary.
    #[error("Firmware {id} already has a binary")]
    AlreadyUploaded {
        /// The record id.
        id: FirmwareId,
    },

    /// Uploaded payload has no bytes.
    #[error("Firmware payload is empty")]
    EmptyPayload,

    /// Payload digest differs from a declared digest.
    #[error(transparent)]
    DigestMismatch(#[from] DigestMismatch),

    /// Record creation without target boards.
    #[error("At least one board is required")]
    EmptyBoards,

    /// Record creation without a repository name.
    #[error("repo_name is required")]
    MissingRepoName,
}

impl From<FirmwareError> for AppError {
    fn from(err: FirmwareError) -> Self {
        match err {
            FirmwareError::NotFound { .. } => AppError::not_found(err.to_string()),
            FirmwareError::AlreadyUploaded { .. } => AppError::conflict(err.to_string()),
            FirmwareError::DigestMismatch(mismatch) => mismatch.into(),
            FirmwareError::EmptyPayload
            | FirmwareError::EmptyBoards
            | FirmwareError::MissingRepoName => AppError::validation(err.to_string()),
        }
    }
}
