//! # ota-database
//!
//! SQLite connection management and the firmware catalog repository.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::firmware::FirmwareRepository;
