//! JWT claims carried by every bearer token.

use serde::{Deserialize, Serialize};

/// Claims payload. Tokens carry no expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer the token is bound to.
    pub iss: String,
    /// Subject name: a board name or an operator name.
    pub sub: String,
    /// Whether the subject is a board.
    pub board: bool,
}
