//! Body and query extraction helpers.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` (or the `Query`
//! equivalent) and pass it here, so malformed input renders with the same
//! error body as every other failure.

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use validator::Validate;

use ota_core::error::AppError;

/// Unwraps a JSON body and runs its validation rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) =
        result.map_err(|e| AppError::validation(format!("Invalid JSON body: {}", e.body_text())))?;
    value
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(value)
}

/// Unwraps query parameters and runs their validation rules.
pub fn extract_validated_query<T: Validate>(
    result: Result<Query<T>, QueryRejection>,
) -> Result<T, AppError> {
    let Query(value) = result.map_err(|e| {
        AppError::validation(format!("Invalid query parameters: {}", e.body_text()))
    })?;
    value
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(value)
}
