//! Firmware metadata and upload handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

use ota_core::error::AppError;

use super::DIGEST_HEADER;
use crate::dto::request::{CreateFirmwareRequest, LatestFirmwareQuery};
use crate::dto::response::FirmwareResponse;
use crate::error::ApiResult;
use crate::extractors::{
    AuthSubject, FirmwarePath, extract_validated_json, extract_validated_query,
};
use crate::state::AppState;

/// POST /api/v1/firmwares
pub async fn create_firmware(
    State(state): State<AppState>,
    auth: AuthSubject,
    body: Result<Json<CreateFirmwareRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FirmwareResponse>)> {
    let req = extract_validated_json(body)?;

    let record = state
        .firmware_service
        .create_firmware(&auth, req.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FirmwareResponse::from_record(record, state.public_url())),
    ))
}

/// GET /api/v1/firmwares
pub async fn list_firmwares(
    State(state): State<AppState>,
    auth: AuthSubject,
) -> ApiResult<Json<Vec<FirmwareResponse>>> {
    let records = state.firmware_service.list_all_firmwares(&auth).await?;
    let public_url = state.public_url();
    Ok(Json(
        records
            .into_iter()
            .map(|r| FirmwareResponse::from_record(r, public_url))
            .collect(),
    ))
}

/// GET /api/v1/firmwares/latest?repo=...
///
/// The board is the caller.
pub async fn get_latest(
    State(state): State<AppState>,
    auth: AuthSubject,
    query: Result<Query<LatestFirmwareQuery>, QueryRejection>,
) -> ApiResult<Json<FirmwareResponse>> {
    let query = extract_validated_query(query)?;

    let record = state
        .firmware_service
        .get_latest_firmware(&auth, &query.repo)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No firmware for repo '{}' and board '{}'",
                query.repo,
                auth.subject_name()
            ))
        })?;

    Ok(Json(FirmwareResponse::from_record(record, state.public_url())))
}

/// GET /api/v1/firmwares/{id}
pub async fn get_firmware(
    State(state): State<AppState>,
    auth: AuthSubject,
    FirmwarePath(id): FirmwarePath,
) -> ApiResult<Json<FirmwareResponse>> {
    let record = state.firmware_service.get_firmware(&auth, id).await?;
    Ok(Json(FirmwareResponse::from_record(record, state.public_url())))
}

/// PUT /api/v1/firmwares/{id}/binary
///
/// Raw body is the payload. An optional `X-Firmware-Digest` header is
/// checked against it.
pub async fn upload_binary(
    State(state): State<AppState>,
    auth: AuthSubject,
    FirmwarePath(id): FirmwarePath,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<FirmwareResponse>> {
    let declared = headers
        .get(DIGEST_HEADER)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::validation("Digest header is not valid ASCII"))
        })
        .transpose()?;

    let record = state
        .upload_service
        .add_firmware_file(&auth, id, body, declared)
        .await?;

    Ok(Json(FirmwareResponse::from_record(record, state.public_url())))
}
