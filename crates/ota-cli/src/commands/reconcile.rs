//! Storage reconciliation command.

use std::sync::Arc;

use ota_core::config::AppConfig;
use ota_core::error::AppError;
use ota_database::FirmwareRepository;
use ota_service::UploadService;

use crate::output::{self, OutputFormat};

/// Remove orphaned payloads and stale staging files
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let db = super::connect_db(config).await?;
    let store = super::open_store(config).await?;
    let upload = UploadService::new(
        Arc::new(FirmwareRepository::new(db.pool().clone())),
        store,
        config.storage.clone(),
    );

    let report = upload.reconcile().await?;
    db.close().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            output::print_success("Reconcile finished.");
            output::print_kv("Payloads scanned", &report.scanned.to_string());
            output::print_kv("Orphans removed", &report.orphans_removed.to_string());
            output::print_kv("Orphans within grace", &report.orphans_pending.to_string());
            output::print_kv("Staging files removed", &report.staging_removed.to_string());
            for id in &report.missing_payloads {
                output::print_warning(&format!("Shipped firmware {id} has no payload"));
            }
        }
    }
    Ok(())
}
