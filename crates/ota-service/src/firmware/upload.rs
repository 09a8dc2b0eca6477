//! Binary upload: the `Created -> Shipped` transition.
//!
//! The payload is published write-once before the catalog is updated, and
//! the catalog update only succeeds on a record that has no binary yet.
//! Together these give a single winner when two uploads race on one id.
//! A payload left behind by a failed catalog update stays in the store:
//! a concurrent or later upload with the same digest may already have
//! adopted it. A retry with the same bytes adopts it, otherwise
//! [`UploadService::reconcile`] removes it once the grace period passes.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use ota_auth::Capability;
use ota_core::config::StorageConfig;
use ota_core::error::AppError;
use ota_core::traits::{BinaryStore, WriteOutcome};
use ota_core::types::FirmwareId;
use ota_database::FirmwareRepository;
use ota_entity::firmware::FirmwareRecord;
use ota_storage::{compute_digest, normalize_declared, verify_digest};

use super::error::FirmwareError;
use crate::context::RequestContext;

/// Handles binary uploads and storage reconciliation.
#[derive(Clone)]
pub struct UploadService {
    /// Catalog repository.
    repo: Arc<FirmwareRepository>,
    /// Binary store.
    store: Arc<dyn BinaryStore>,
    /// Storage configuration.
    config: StorageConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("store", &self.store.provider_type())
            .finish()
    }
}

/// Summary of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Payloads examined.
    pub scanned: usize,
    /// Payloads removed because no shipped record owns them.
    pub orphans_removed: usize,
    /// Orphans skipped because they are younger than the grace period.
    pub orphans_pending: usize,
    /// Stale staging files removed.
    pub staging_removed: usize,
    /// Shipped records whose payload is missing from the store.
    pub missing_payloads: Vec<FirmwareId>,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        repo: Arc<FirmwareRepository>,
        store: Arc<dyn BinaryStore>,
        config: StorageConfig,
    ) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    /// Attaches a binary to a record. Operators only.
    ///
    /// `declared_digest` is an optional digest supplied with the upload;
    /// it is checked alongside the digest declared when the record was
    /// created. Nothing is written when either does not match.
    pub async fn add_firmware_file(
        &self,
        ctx: &RequestContext,
        id: FirmwareId,
        payload: Bytes,
        declared_digest: Option<&str>,
    ) -> Result<FirmwareRecord, AppError> {
        ctx.require(Capability::Operator)?;

        let record = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or(FirmwareError::NotFound { id })?;
        if record.has_binary() {
            return Err(FirmwareError::AlreadyUploaded { id }.into());
        }
        if payload.is_empty() {
            return Err(FirmwareError::EmptyPayload.into());
        }

        let digest = compute_digest(&payload);
        verify_digest(record.expected_digest.as_deref(), &digest)
            .map_err(FirmwareError::from)?;
        if let Some(declared) = declared_digest {
            let declared = normalize_declared(declared)?;
            verify_digest(Some(&declared), &digest).map_err(FirmwareError::from)?;
        }

        let size = payload.len() as i64;
        let outcome = self.store.write_once(&id, payload).await?;
        if outcome == WriteOutcome::AlreadyExists {
            self.check_existing_payload(&id, &digest).await?;
        }

        match self.repo.update_binary_info(&id, &digest, size).await {
            Ok(true) => {}
            Ok(false) => return Err(FirmwareError::AlreadyUploaded { id }.into()),
            Err(e) => {
                if outcome == WriteOutcome::Created {
                    warn!(
                        firmware_id = %id,
                        error = %e,
                        "Catalog update failed, payload left for retry or reconcile"
                    );
                }
                return Err(e);
            }
        }

        info!(
            firmware_id = %id,
            size,
            digest = %digest,
            subject = %ctx.subject_name(),
            "Firmware shipped"
        );

        Ok(FirmwareRecord {
            digest,
            size,
            ..record
        })
    }

    /// A payload is already present while the record is unshipped: a
    /// previous attempt published it and then failed, or a concurrent
    /// upload is in flight. Adopt it only if it carries the same bytes.
    async fn check_existing_payload(&self, id: &FirmwareId, digest: &str) -> Result<(), AppError> {
        let existing = self.store.read_bytes(id).await?;
        let existing_digest = compute_digest(&existing);
        if existing_digest != digest {
            warn!(
                firmware_id = %id,
                existing = %existing_digest,
                uploaded = %digest,
                "Payload already present with different content"
            );
            return Err(FirmwareError::AlreadyUploaded { id: *id }.into());
        }
        info!(firmware_id = %id, "Adopting previously published payload");
        Ok(())
    }

    /// Files last modified before this instant are past the grace period.
    fn grace_cutoff(&self) -> Result<DateTime<Utc>, AppError> {
        let grace = self.config.orphan_grace_seconds;
        i64::try_from(grace)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| Utc::now().checked_sub_signed(delta))
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "storage.orphan_grace_seconds is out of range: {grace}"
                ))
            })
    }

    /// Removes payloads no shipped record owns and stale staging files,
    /// both only once they are older than the configured grace period.
    pub async fn reconcile(&self) -> Result<ReconcileReport, AppError> {
        let cutoff = self.grace_cutoff()?;

        let records: HashMap<FirmwareId, FirmwareRecord> = self
            .repo
            .list_all()
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        let stored = self.store.list().await?;

        let mut report = ReconcileReport {
            scanned: stored.len(),
            ..ReconcileReport::default()
        };

        for binary in &stored {
            let owned = records
                .get(&binary.id)
                .is_some_and(FirmwareRecord::has_binary);
            if owned {
                continue;
            }
            if binary.modified_at >= cutoff {
                report.orphans_pending += 1;
                continue;
            }
            self.store.delete(&binary.id).await?;
            info!(firmware_id = %binary.id, size = binary.size_bytes, "Removed orphaned payload");
            report.orphans_removed += 1;
        }

        let present: std::collections::HashSet<FirmwareId> =
            stored.iter().map(|b| b.id).collect();
        for record in records.values().filter(|r| r.has_binary()) {
            if !present.contains(&record.id) {
                error!(firmware_id = %record.id, "Shipped firmware has no payload");
                report.missing_payloads.push(record.id);
            }
        }
        report.missing_payloads.sort();

        report.staging_removed = self.store.purge_staging(cutoff).await?;

        info!(
            scanned = report.scanned,
            orphans_removed = report.orphans_removed,
            orphans_pending = report.orphans_pending,
            staging_removed = report.staging_removed,
            missing = report.missing_payloads.len(),
            "Reconcile finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ota_core::error::ErrorKind;

    use crate::testing::{Harness, board, new_firmware, operator};

    #[tokio::test]
    async fn test_upload_ships_record() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;

        assert!(
            h.firmware
                .get_latest_firmware(&board("b1"), "r1")
                .await
                .unwrap()
                .is_none()
        );

        let shipped = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap();
        assert_eq!(shipped.size, 3);
        assert_eq!(shipped.digest, "900150983cd24fb0d6963f7d28e17f72");

        let latest = h
            .firmware
            .get_latest_firmware(&board("b1"), "r1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest, shipped);
        assert_eq!(
            h.store.read_bytes(&fw.id).await.unwrap(),
            Bytes::from_static(b"abc")
        );
    }

    #[tokio::test]
    async fn test_second_upload_conflicts() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;
        h.upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap();

        for payload in [&b"abc"[..], &b"different"[..], &b""[..]] {
            let err = h
                .upload
                .add_firmware_file(&operator(), fw.id, Bytes::copy_from_slice(payload), None)
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Conflict);
        }
        assert_eq!(
            h.store.read_bytes(&fw.id).await.unwrap(),
            Bytes::from_static(b"abc")
        );
    }

    #[tokio::test]
    async fn test_empty_payload_leaves_record_created() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;

        let err = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let record = h.firmware.get_firmware(&operator(), fw.id).await.unwrap();
        assert_eq!(record.size, 0);
        assert!(record.digest.is_empty());
        assert!(!h.store.exists(&fw.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_record_is_not_found() {
        let h = Harness::new().await;
        let err = h
            .upload
            .add_firmware_file(&operator(), FirmwareId::new(), Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_board_cannot_upload() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;
        let err = h
            .upload
            .add_firmware_file(&board("b1"), fw.id, Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_declared_digest_mismatch_writes_nothing() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;

        let err = h
            .upload
            .add_firmware_file(
                &operator(),
                fw.id,
                Bytes::from_static(b"abc"),
                Some("d41d8cd98f00b204e9800998ecf8427e"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(!h.store.exists(&fw.id).await.unwrap());

        h.upload
            .add_firmware_file(
                &operator(),
                fw.id,
                Bytes::from_static(b"abc"),
                Some("900150983CD24FB0D6963F7D28E17F72"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expected_digest_from_creation_is_enforced() {
        let h = Harness::new().await;
        let mut req = new_firmware("r1", &["b1"]);
        req.expected_digest = Some("900150983cd24fb0d6963f7d28e17f72".into());
        let fw = h.firmware.create_firmware(&operator(), req).await.unwrap();

        let err = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abd"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let shipped = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap();
        assert_eq!(shipped.size, 3);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_have_single_winner() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;
        let ctx = operator();

        let (a, b) = tokio::join!(
            h.upload
                .add_firmware_file(&ctx, fw.id, Bytes::from_static(b"payload-a"), None),
            h.upload
                .add_firmware_file(&ctx, fw.id, Bytes::from_static(b"payload-b"), None),
        );

        let results = [a, b];
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind, ErrorKind::Conflict);

        let record = h.firmware.get_firmware(&ctx, fw.id).await.unwrap();
        assert_eq!(record.digest, winners[0].digest);
        let stored = h.store.read_bytes(&fw.id).await.unwrap();
        assert_eq!(compute_digest(&stored), record.digest);
    }

    #[tokio::test]
    async fn test_retry_adopts_leftover_payload_with_same_digest() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;
        assert_eq!(
            h.store
                .write_once(&fw.id, Bytes::from_static(b"abc"))
                .await
                .unwrap(),
            WriteOutcome::Created
        );

        let shipped = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap();
        assert_eq!(shipped.size, 3);
    }

    #[tokio::test]
    async fn test_leftover_payload_with_other_digest_conflicts() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;
        assert_eq!(
            h.store
                .write_once(&fw.id, Bytes::from_static(b"stale"))
                .await
                .unwrap(),
            WriteOutcome::Created
        );

        let err = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        let record = h.firmware.get_firmware(&operator(), fw.id).await.unwrap();
        assert_eq!(record.size, 0);
    }

    async fn fail_catalog_updates(h: &Harness) {
        sqlx::query(
            "CREATE TRIGGER fail_ship BEFORE UPDATE ON firmwares \
             BEGIN SELECT RAISE(ABORT, 'disk I/O error'); END",
        )
        .execute(&h.pool)
        .await
        .unwrap();
    }

    async fn restore_catalog_updates(h: &Harness) {
        sqlx::query("DROP TRIGGER fail_ship")
            .execute(&h.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_catalog_update_keeps_payload_for_adoption() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;

        fail_catalog_updates(&h).await;
        let err = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        restore_catalog_updates(&h).await;

        // Another upload of the same bytes may already have adopted the
        // payload, so the failed request must not remove it.
        assert!(h.store.exists(&fw.id).await.unwrap());
        let record = h.firmware.get_firmware(&operator(), fw.id).await.unwrap();
        assert_eq!(record.size, 0);

        let shipped = h
            .upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap();
        assert_eq!(shipped.size, 3);
        let stored = h.store.read_bytes(&fw.id).await.unwrap();
        assert_eq!(compute_digest(&stored), shipped.digest);

        let location = h.download.get_binary_location(fw.id).await.unwrap();
        assert!(location.is_some());
    }

    #[tokio::test]
    async fn test_reconcile_removes_payload_of_failed_update_after_grace() {
        let h = Harness::with_grace(0).await;
        let fw = h.create("r1", &["b1"]).await;

        fail_catalog_updates(&h).await;
        h.upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap_err();
        restore_catalog_updates(&h).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let report = h.upload.reconcile().await.unwrap();
        assert_eq!(report.orphans_removed, 1);
        assert!(!h.store.exists(&fw.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_reconcile_rejects_out_of_range_grace() {
        let h = Harness::with_grace(u64::MAX).await;
        let err = h.upload.reconcile().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let h = Harness::with_grace(i64::MAX as u64).await;
        let err = h.upload.reconcile().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_reconcile_removes_orphans_after_grace() {
        let h = Harness::with_grace(0).await;
        let shipped = h.create("r1", &["b1"]).await;
        h.upload
            .add_firmware_file(&operator(), shipped.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap();
        let unshipped = h.create("r1", &["b1"]).await;
        assert_eq!(
            h.store
                .write_once(&unshipped.id, Bytes::from_static(b"half"))
                .await
                .unwrap(),
            WriteOutcome::Created
        );
        let unknown = FirmwareId::new();
        assert_eq!(
            h.store
                .write_once(&unknown, Bytes::from_static(b"lost"))
                .await
                .unwrap(),
            WriteOutcome::Created
        );
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let report = h.upload.reconcile().await.unwrap();
        assert_eq!(report.scanned, 3);
        assert_eq!(report.orphans_removed, 2);
        assert!(report.missing_payloads.is_empty());

        assert!(h.store.exists(&shipped.id).await.unwrap());
        assert!(!h.store.exists(&unshipped.id).await.unwrap());
        assert!(!h.store.exists(&unknown).await.unwrap());
    }

    #[tokio::test]
    async fn test_reconcile_keeps_recent_orphans() {
        let h = Harness::with_grace(3600).await;
        let fw = h.create("r1", &["b1"]).await;
        assert_eq!(
            h.store
                .write_once(&fw.id, Bytes::from_static(b"in-flight"))
                .await
                .unwrap(),
            WriteOutcome::Created
        );

        let report = h.upload.reconcile().await.unwrap();
        assert_eq!(report.orphans_removed, 0);
        assert_eq!(report.orphans_pending, 1);
        assert!(h.store.exists(&fw.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_reconcile_reports_missing_payloads() {
        let h = Harness::new().await;
        let fw = h.create("r1", &["b1"]).await;
        h.upload
            .add_firmware_file(&operator(), fw.id, Bytes::from_static(b"abc"), None)
            .await
            .unwrap();
        h.store.delete(&fw.id).await.unwrap();

        let report = h.upload.reconcile().await.unwrap();
        assert_eq!(report.missing_payloads, vec![fw.id]);
    }
}
