//! # ota-core
//!
//! Core crate for the OTA firmware catalog. Contains the configuration
//! schema, typed identifiers, the binary store trait, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other OTA crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
