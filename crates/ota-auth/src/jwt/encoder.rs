//! JWT token creation.

use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::debug;

use ota_core::config::AuthConfig;
use ota_core::error::AppError;

use super::claims::TokenClaims;
use crate::subject::TokenSubject;

/// Creates signed bearer tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer stamped into every token.
    issuer: String,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_signing_key.as_bytes()),
            issuer: config.jwt_issuer.clone(),
        }
    }

    /// Issues a token for the given subject.
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, AppError> {
        if subject.name.trim().is_empty() {
            return Err(AppError::validation("Token subject must not be empty"));
        }

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            sub: subject.name.clone(),
            board: subject.is_board,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        debug!(subject = %subject.name, board = subject.is_board, "Issued token");
        Ok(token)
    }
}
