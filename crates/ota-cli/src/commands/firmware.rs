//! Firmware catalog inspection commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use ota_auth::TokenSubject;
use ota_core::config::AppConfig;
use ota_core::error::AppError;
use ota_core::types::FirmwareId;
use ota_database::FirmwareRepository;
use ota_entity::firmware::FirmwareRecord;
use ota_service::{FirmwareService, RequestContext};

/// Arguments for firmware commands
#[derive(Debug, Args)]
pub struct FirmwareArgs {
    /// Firmware subcommand
    #[command(subcommand)]
    pub command: FirmwareCommand,
}

/// Firmware subcommands
#[derive(Debug, Subcommand)]
pub enum FirmwareCommand {
    /// List all firmware records, newest first
    List,
    /// Show one firmware record
    Show {
        /// Firmware id
        id: String,
    },
}

/// Firmware display row for table output
#[derive(Debug, Serialize, Tabled)]
struct FirmwareRow {
    /// Record id
    id: String,
    /// Repository
    repo: String,
    /// Commit
    commit: String,
    /// Boards
    boards: String,
    /// State
    state: String,
    /// Size in bytes
    size: i64,
    /// Digest
    digest: String,
    /// Created at
    created_at: String,
    /// Created by
    created_by: String,
}

impl From<&FirmwareRecord> for FirmwareRow {
    fn from(r: &FirmwareRecord) -> Self {
        Self {
            id: r.id.to_string(),
            repo: r.repo_name.clone(),
            commit: r.commit_id.clone().unwrap_or_default(),
            boards: r.boards.join(","),
            state: format!("{:?}", r.state()).to_lowercase(),
            size: r.size,
            digest: r.digest.clone(),
            created_at: r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            created_by: r.created_by.clone(),
        }
    }
}

/// Execute firmware commands
pub async fn execute(
    args: &FirmwareArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect_db(config).await?;
    let service = FirmwareService::new(Arc::new(FirmwareRepository::new(db.pool().clone())));
    let ctx = RequestContext::local(TokenSubject::operator("cli"));

    let records = match &args.command {
        FirmwareCommand::List => service.list_all_firmwares(&ctx).await?,
        FirmwareCommand::Show { id } => {
            let id = id
                .parse::<FirmwareId>()
                .map_err(|_| AppError::validation(format!("Invalid firmware id: {id}")))?;
            vec![service.get_firmware(&ctx, id).await?]
        }
    };

    let rows: Vec<FirmwareRow> = records.iter().map(FirmwareRow::from).collect();
    output::print_list(&rows, format);
    db.close().await;
    Ok(())
}
