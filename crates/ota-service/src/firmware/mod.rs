//! Firmware catalog services: metadata, upload, download.

pub mod download;
pub mod error;
pub mod service;
pub mod upload;

pub use download::{DownloadService, DownloadTarget};
pub use error::FirmwareError;
pub use service::{FirmwareService, NewFirmware};
pub use upload::{ReconcileReport, UploadService};
