//! Route handlers organized by domain.

pub mod binary;
pub mod firmware;
pub mod health;

/// Header carrying a payload digest, on upload and on download.
pub const DIGEST_HEADER: &str = "x-firmware-digest";
