//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use ota_service::NewFirmware;

/// Create firmware request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFirmwareRequest {
    /// Repository the build came from.
    #[validate(length(min = 1, max = 255, message = "repo_name is required"))]
    pub repo_name: String,
    /// Commit the build came from.
    #[validate(length(max = 128))]
    pub commit_id: Option<String>,
    /// Target boards.
    #[validate(length(min = 1, message = "At least one board is required"))]
    pub boards: Vec<String>,
    /// Free text.
    #[serde(default)]
    #[validate(length(max = 4096))]
    pub description: String,
    /// Digest the binary will have.
    #[validate(length(equal = 32, message = "expected_digest must be 32 hex characters"))]
    pub expected_digest: Option<String>,
}

impl From<CreateFirmwareRequest> for NewFirmware {
    fn from(req: CreateFirmwareRequest) -> Self {
        Self {
            repo_name: req.repo_name,
            commit_id: req.commit_id,
            boards: req.boards,
            description: req.description,
            expected_digest: req.expected_digest,
        }
    }
}

/// Query for the latest firmware of a repository.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LatestFirmwareQuery {
    /// Repository name.
    #[validate(length(min = 1, message = "repo is required"))]
    pub repo: String,
}
