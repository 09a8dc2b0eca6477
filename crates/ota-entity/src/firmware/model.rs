//! Firmware record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ota_core::types::FirmwareId;

/// Lifecycle state of a firmware record.
///
/// `Created -> Shipped` happens exactly once, when the binary upload
/// succeeds. There are no other transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirmwareState {
    /// Metadata exists, no binary uploaded yet.
    Created,
    /// Binary uploaded and verified.
    Shipped,
}

/// One firmware release as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareRecord {
    /// Opaque identifier, also the binary store address.
    pub id: FirmwareId,
    /// Repository the build came from.
    pub repo_name: String,
    /// Commit the build came from, if known.
    pub commit_id: Option<String>,
    /// Board names this release targets, sorted and de-duplicated.
    pub boards: Vec<String>,
    /// Insert time, assigned by the catalog.
    pub created_at: DateTime<Utc>,
    /// Subject name of the operator who created the record.
    pub created_by: String,
    /// Content digest of the uploaded binary; empty until upload.
    pub digest: String,
    /// Digest the operator declared at creation, if any.
    pub expected_digest: Option<String>,
    /// Free text.
    pub description: String,
    /// Byte length of the uploaded binary; `0` means nothing uploaded yet.
    pub size: i64,
}

impl FirmwareRecord {
    /// Whether a binary has been attached.
    pub fn has_binary(&self) -> bool {
        self.size != 0
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FirmwareState {
        if self.has_binary() {
            FirmwareState::Shipped
        } else {
            FirmwareState::Created
        }
    }
}

/// Data required to create a new firmware record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFirmware {
    /// Repository the build came from.
    pub repo_name: String,
    /// Commit the build came from.
    pub commit_id: Option<String>,
    /// Target boards (non-empty).
    pub boards: Vec<String>,
    /// Free text.
    pub description: String,
    /// Digest the binary is expected to have.
    pub expected_digest: Option<String>,
    /// Operator creating the record.
    pub created_by: String,
}
