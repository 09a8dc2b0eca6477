//! Authenticated subjects and capability checks.

use std::fmt;

use ota_core::error::AppError;

/// What a subject is allowed to do. A token grants exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Devices: ask for their latest firmware.
    Board,
    /// Build tooling and humans: create, upload, list, inspect.
    Operator,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => write!(f, "board"),
            Self::Operator => write!(f, "operator"),
        }
    }
}

/// The identity extracted from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// Board name or operator name.
    pub name: String,
    /// Whether this subject is a board.
    pub is_board: bool,
}

impl TokenSubject {
    /// A board subject.
    pub fn board(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_board: true,
        }
    }

    /// An operator subject.
    pub fn operator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_board: false,
        }
    }

    /// The capability this subject holds.
    pub fn capability(&self) -> Capability {
        if self.is_board {
            Capability::Board
        } else {
            Capability::Operator
        }
    }

    /// Returns `Err(Forbidden)` unless the subject holds `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.capability() == capability {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Subject '{}' is a {}, {} capability required",
                self.name,
                self.capability(),
                capability
            )))
        }
    }
}
