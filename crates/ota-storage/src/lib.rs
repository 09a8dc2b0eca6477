//! # ota-storage
//!
//! Binary store implementations for firmware payloads, plus the content
//! verifier that computes and checks payload digests.

pub mod digest;
pub mod providers;

pub use digest::{DigestMismatch, compute_digest, normalize_declared, verify_digest};
#[cfg(feature = "local")]
pub use providers::local::LocalBinaryStore;
