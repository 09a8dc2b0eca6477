//! CLI command definitions and dispatch.

pub mod firmware;
pub mod migrate;
pub mod reconcile;
pub mod serve;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use ota_core::config::AppConfig;
use ota_core::error::AppError;
use ota_core::traits::BinaryStore;
use ota_database::DatabasePool;
use ota_storage::LocalBinaryStore;

/// OTA firmware catalog administration
#[derive(Debug, Parser)]
#[command(name = "ota", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml", env = "OTA_CONFIG")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development", env = "OTA_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the OTA server
    Serve(serve::ServeArgs),
    /// Apply database migrations
    Migrate,
    /// Issue a bearer token
    Token(token::TokenArgs),
    /// Inspect the firmware catalog
    Firmware(firmware::FirmwareArgs),
    /// Remove orphaned payloads and stale staging files
    Reconcile,
}

impl Commands {
    /// Whether the command keeps running (and deserves full logging).
    pub fn is_long_running(&self) -> bool {
        matches!(self, Self::Serve(_))
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Token(args) => token::execute(args, &config),
            Commands::Firmware(args) => firmware::execute(args, &config, self.format).await,
            Commands::Reconcile => reconcile::execute(&config, self.format).await,
        }
    }
}

/// Helper: connect to the catalog
pub async fn connect_db(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: open the binary store
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn BinaryStore>, AppError> {
    let store = LocalBinaryStore::new(&config.storage.root_path).await?;
    Ok(Arc::new(store))
}
