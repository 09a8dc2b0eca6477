//! Core traits defined in `ota-core` and implemented by other crates.

pub mod storage;

pub use storage::{BinaryLocation, BinaryStore, ByteStream, StoredBinary, WriteOutcome};
