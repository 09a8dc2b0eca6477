//! Content verification for firmware payloads.
//!
//! Digests are MD5, rendered as 32 lowercase hex characters. Devices
//! compare this value against what they downloaded, so the format is
//! part of the wire contract.

use md5::{Digest, Md5};
use thiserror::Error;

use ota_core::error::{AppError, ErrorKind};

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 32;

/// A declared digest did not match the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("digest mismatch: declared {declared}, computed {computed}")]
pub struct DigestMismatch {
    /// The digest the caller declared.
    pub declared: String,
    /// The digest of the bytes actually received.
    pub computed: String,
}

impl From<DigestMismatch> for AppError {
    fn from(err: DigestMismatch) -> Self {
        let message = err.to_string();
        AppError::with_source(ErrorKind::Validation, message, err)
    }
}

/// Compute the digest of a payload.
pub fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Normalize a caller-supplied digest to lowercase hex.
pub fn normalize_declared(declared: &str) -> Result<String, AppError> {
    let trimmed = declared.trim();
    if trimmed.len() != DIGEST_HEX_LEN || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::validation(format!(
            "Digest must be {DIGEST_HEX_LEN} hex characters, got '{trimmed}'"
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Check `computed` against a declared digest, when one is present.
pub fn verify_digest(declared: Option<&str>, computed: &str) -> Result<(), DigestMismatch> {
    match declared {
        Some(declared) if !declared.eq_ignore_ascii_case(computed) => Err(DigestMismatch {
            declared: declared.to_string(),
            computed: computed.to_string(),
        }),
        _ => Ok(()),
    }
}
