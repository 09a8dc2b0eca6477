//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use ota_core::config::AuthConfig;
use ota_core::error::AppError;

use super::claims::TokenClaims;
use crate::subject::TokenSubject;

/// Validates bearer tokens and resolves them to a [`TokenSubject`].
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["iss", "sub"]);
        validation.set_issuer(&[config.jwt_issuer.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_signing_key.as_bytes()),
            validation,
        }
    }

    /// Validates a token string.
    ///
    /// Any failure (signature, issuer, malformed or missing claims) is
    /// reported as `Unauthorized`.
    pub fn validate(&self, token: &str) -> Result<TokenSubject, AppError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                debug!(error = %e, "Token rejected");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::unauthorized("Invalid token issuer")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    _ => AppError::unauthorized(format!("Token validation failed: {e}")),
                }
            },
        )?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(AppError::unauthorized("Token subject is empty"));
        }

        Ok(TokenSubject {
            name: claims.sub,
            is_board: claims.board,
        })
    }
}
