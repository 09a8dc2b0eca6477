//! Database migration command.

use ota_core::config::AppConfig;
use ota_core::error::AppError;
use ota_database::migration::run_migrations;

use crate::output;

/// Run all pending migrations
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect_db(config).await?;
    run_migrations(db.pool()).await?;
    db.close().await;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
