//! Payload download handler.

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use ota_core::error::{AppError, ErrorKind};
use ota_core::traits::BinaryLocation;

use super::DIGEST_HEADER;
use crate::error::ApiResult;
use crate::extractors::{AuthSubject, FirmwarePath};
use crate::state::AppState;

/// GET /api/v1/bin/{id}
///
/// Streams the payload of a shipped record to any authenticated caller.
pub async fn download(
    State(state): State<AppState>,
    auth: AuthSubject,
    FirmwarePath(id): FirmwarePath,
) -> ApiResult<Response> {
    let target = state
        .download_service
        .resolve_download(&auth, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Firmware binary {id} not found")))?;

    let body = match &target.location {
        BinaryLocation::LocalFile(path) => {
            let file = tokio::fs::File::open(path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Payload for shipped firmware {id} is unreadable"),
                    e,
                )
            })?;
            Body::from_stream(ReaderStream::new(file))
        }
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, target.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{id}.bin\""),
        )
        .header(DIGEST_HEADER, target.digest.as_str())
        .body(body)
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
