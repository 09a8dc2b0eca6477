//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ota_core::types::FirmwareId;
use ota_entity::firmware::FirmwareRecord;

/// Firmware record as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareResponse {
    /// Record id.
    pub id: FirmwareId,
    /// Repository name.
    pub repo_name: String,
    /// Commit id.
    pub commit_id: Option<String>,
    /// Target boards.
    pub boards: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creating operator.
    pub created_by: String,
    /// Payload digest, empty until shipped.
    pub digest: String,
    /// Free text.
    pub description: String,
    /// Payload size, 0 until shipped.
    pub size: i64,
    /// Whether a binary is attached.
    pub shipped: bool,
    /// Download link, only once shipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_url: Option<String>,
}

impl FirmwareResponse {
    /// Builds the response, composing `bin_url` from the public base URL.
    pub fn from_record(record: FirmwareRecord, public_url: &str) -> Self {
        let shipped = record.has_binary();
        let bin_url = shipped.then(|| format!("{public_url}/api/v1/bin/{}", record.id));
        Self {
            id: record.id,
            repo_name: record.repo_name,
            commit_id: record.commit_id,
            boards: record.boards,
            created_at: record.created_at,
            created_by: record.created_by,
            digest: record.digest,
            description: record.description,
            size: record.size,
            shipped,
            bin_url,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Catalog database status.
    pub database: String,
    /// Binary store status.
    pub storage: String,
}
