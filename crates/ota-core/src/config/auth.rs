//! Token signing configuration.

use serde::{Deserialize, Serialize};

/// Bearer token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    pub jwt_signing_key: String,
    /// Issuer every token is bound to.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
}

fn default_issuer() -> String {
    "ota-server".to_string()
}
