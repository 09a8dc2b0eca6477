//! Binary storage configuration.

use serde::{Deserialize, Serialize};

/// Upper bound for `orphan_grace_seconds` (ten years).
pub const MAX_ORPHAN_GRACE_SECONDS: u64 = 10 * 365 * 24 * 3600;

/// Firmware binary storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for firmware payloads.
    #[serde(default = "default_root")]
    pub root_path: String,
    /// Minimum age before an orphaned payload or staging file is removed.
    #[serde(default = "default_orphan_grace")]
    pub orphan_grace_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root(),
            orphan_grace_seconds: default_orphan_grace(),
        }
    }
}

fn default_root() -> String {
    "./data/binaries".to_string()
}

fn default_orphan_grace() -> u64 {
    3600
}
