//! Custom Axum extractors.

pub mod auth;
pub mod body;
pub mod path;

pub use auth::AuthSubject;
pub use body::{extract_validated_json, extract_validated_query};
pub use path::FirmwarePath;
