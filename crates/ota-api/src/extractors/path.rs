//! Typed path parameter extractors.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use ota_core::error::AppError;
use ota_core::types::FirmwareId;

use crate::error::ApiError;

/// Firmware id taken from the `{id}` path segment.
///
/// A segment that is not a valid id cannot name any record, so it is
/// reported as not found.
#[derive(Debug, Clone, Copy)]
pub struct FirmwarePath(pub FirmwareId);

impl<S: Send + Sync> FromRequestParts<S> for FirmwarePath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        let id = raw
            .parse::<FirmwareId>()
            .map_err(|_| AppError::not_found(format!("Firmware {raw} not found")))?;
        Ok(Self(id))
    }
}
