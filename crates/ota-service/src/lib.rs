//! # ota-service
//!
//! Business logic for the OTA firmware catalog. Services orchestrate the
//! catalog repository, the binary store, and the content verifier, and
//! gate every operation on the capability of the calling subject.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod firmware;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use firmware::{
    DownloadService, DownloadTarget, FirmwareError, FirmwareService, NewFirmware,
    ReconcileReport, UploadService,
};
