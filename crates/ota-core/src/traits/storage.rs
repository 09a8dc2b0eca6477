//! Binary store trait for pluggable firmware payload backends.

use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;

use crate::result::AppResult;
use crate::types::FirmwareId;

/// A byte stream type used for reading payloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Where the transport layer can fetch a payload from without going
/// through the catalog service again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryLocation {
    /// A file on the local filesystem.
    LocalFile(PathBuf),
}

/// A payload present in the store, as seen by a listing.
#[derive(Debug, Clone)]
pub struct StoredBinary {
    /// The record id the payload is addressed by.
    pub id: FirmwareId,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub modified_at: DateTime<Utc>,
}

/// Outcome of a write-once publish.
///
/// `AlreadyExists` means nothing was written and must be handled.
#[must_use = "an existing payload for the id was not overwritten"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The payload was created by this call.
    Created,
    /// A payload already existed for the id; nothing was written.
    AlreadyExists,
}

/// Trait for firmware payload backends.
///
/// The store knows nothing about catalog metadata. Callers must confirm
/// through the catalog that a shipped record exists before serving a
/// payload.
#[async_trait]
pub trait BinaryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the backing medium is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Create the payload for `id` if none exists.
    ///
    /// Creation is atomic: concurrent writers for the same id observe
    /// exactly one [`WriteOutcome::Created`].
    async fn write_once(&self, id: &FirmwareId, data: Bytes) -> AppResult<WriteOutcome>;

    /// Read a payload into memory.
    async fn read_bytes(&self, id: &FirmwareId) -> AppResult<Bytes>;

    /// Read a payload as a byte stream.
    async fn read(&self, id: &FirmwareId) -> AppResult<ByteStream>;

    /// Check whether a payload exists for `id`.
    async fn exists(&self, id: &FirmwareId) -> AppResult<bool>;

    /// Remove the payload for `id`. Missing payloads are not an error.
    async fn delete(&self, id: &FirmwareId) -> AppResult<()>;

    /// The address the transport layer streams the payload from.
    fn location_for(&self, id: &FirmwareId) -> BinaryLocation;

    /// List every payload in the store.
    async fn list(&self) -> AppResult<Vec<StoredBinary>>;

    /// Remove abandoned staging files older than `older_than`. Returns the
    /// number removed.
    async fn purge_staging(&self, older_than: DateTime<Utc>) -> AppResult<usize>;
}
