//! Board names a firmware record targets.
//!
//! Each name becomes one `firmware_boards` row, created with its parent
//! record and living exactly as long as it does.

use ota_core::error::AppError;

/// Trim, de-duplicate, and sort board names.
///
/// Fails when the resulting set is empty or any name is blank.
pub fn normalize_boards(boards: &[String]) -> Result<Vec<String>, AppError> {
    let mut normalized = Vec::with_capacity(boards.len());
    for board in boards {
        let name = board.trim();
        if name.is_empty() {
            return Err(AppError::validation("Board names must not be blank"));
        }
        normalized.push(name.to_string());
    }
    normalized.sort();
    normalized.dedup();

    if normalized.is_empty() {
        return Err(AppError::validation(
            "A firmware must target at least one board",
        ));
    }
    Ok(normalized)
}
