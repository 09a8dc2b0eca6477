//! `AuthSubject` extractor: pulls the bearer token from the Authorization
//! header, validates it, and builds the request context.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use ota_core::error::AppError;
use ota_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
///
/// Any valid token is accepted here; capability checks happen in the
/// services.
#[derive(Debug, Clone)]
pub struct AuthSubject(pub RequestContext);

impl std::ops::Deref for AuthSubject {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthSubject {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let subject = state.jwt_decoder.validate(token)?;

        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(AuthSubject(RequestContext::new(subject, ip_address, user_agent)))
    }
}
