//! # ota-auth
//!
//! Authorization for the OTA firmware catalog.
//!
//! ## Modules
//!
//! - `jwt`: signed bearer token creation and validation
//! - `subject`: the authenticated subject and its capability checks

pub mod jwt;
pub mod subject;

pub use jwt::{JwtDecoder, JwtEncoder, TokenClaims};
pub use subject::{Capability, TokenSubject};
