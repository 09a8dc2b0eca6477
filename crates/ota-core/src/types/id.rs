//! Newtype wrapper around [`uuid::Uuid`] for firmware record identifiers.
//!
//! Identifiers are UUIDv7: opaque to callers, safe to use as file names,
//! and ordered by creation time, which the catalog uses as a
//! deterministic tie-break when two records share a timestamp.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a firmware record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FirmwareId(pub Uuid);

impl FirmwareId {
    /// Create a new time-ordered identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for FirmwareId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FirmwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for FirmwareId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for FirmwareId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<FirmwareId> for Uuid {
    fn from(id: FirmwareId) -> Uuid {
        id.0
    }
}
