//! Firmware domain entities.

pub mod board;
pub mod model;

pub use board::normalize_boards;
pub use model::{CreateFirmware, FirmwareRecord, FirmwareState};
