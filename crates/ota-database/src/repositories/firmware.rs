//! Firmware catalog repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use ota_core::error::{AppError, ErrorKind};
use ota_core::result::AppResult;
use ota_core::types::FirmwareId;
use ota_entity::firmware::{CreateFirmware, FirmwareRecord, normalize_boards};

const FIRMWARE_COLUMNS: &str = "f.id, f.repo_name, f.commit_id, f.created_at, f.created_by, \
     f.digest, f.expected_digest, f.description, f.size";

/// Raw `firmwares` row. Timestamps are stored as microseconds since the
/// epoch so that ordering in SQL is numeric.
#[derive(Debug, FromRow)]
struct FirmwareRow {
    id: String,
    repo_name: String,
    commit_id: Option<String>,
    created_at: i64,
    created_by: String,
    digest: String,
    expected_digest: Option<String>,
    description: String,
    size: i64,
}

impl FirmwareRow {
    fn into_record(self, boards: Vec<String>) -> AppResult<FirmwareRecord> {
        let id = self.id.parse::<FirmwareId>().map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Corrupt firmware id in catalog: {}", self.id),
                e,
            )
        })?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(self.created_at)
            .ok_or_else(|| AppError::database(format!("Corrupt created_at for firmware {id}")))?;

        Ok(FirmwareRecord {
            id,
            repo_name: self.repo_name,
            commit_id: self.commit_id,
            boards,
            created_at,
            created_by: self.created_by,
            digest: self.digest,
            expected_digest: self.expected_digest,
            description: self.description,
            size: self.size,
        })
    }
}

/// Repository for firmware records and their board assignments.
#[derive(Debug, Clone)]
pub struct FirmwareRepository {
    pool: SqlitePool,
}

impl FirmwareRepository {
    /// Create a new firmware repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a record and its board assignments in one transaction.
    ///
    /// The record starts with `size = 0` and an empty digest.
    pub async fn create(&self, data: &CreateFirmware) -> AppResult<FirmwareRecord> {
        self.insert(data, FirmwareId::new(), Utc::now()).await
    }

    async fn insert(
        &self,
        data: &CreateFirmware,
        id: FirmwareId,
        created_at: DateTime<Utc>,
    ) -> AppResult<FirmwareRecord> {
        if data.repo_name.trim().is_empty() {
            return Err(AppError::validation("repo_name must not be empty"));
        }
        let boards = normalize_boards(&data.boards)?;
        let created_at_us = created_at.timestamp_micros();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        sqlx::query(
            "INSERT INTO firmwares (id, repo_name, commit_id, created_at, created_by, digest, \
             expected_digest, description, size) VALUES (?, ?, ?, ?, ?, '', ?, ?, 0)",
        )
        .bind(id.to_string())
        .bind(&data.repo_name)
        .bind(&data.commit_id)
        .bind(created_at_us)
        .bind(&data.created_by)
        .bind(&data.expected_digest)
        .bind(&data.description)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert firmware", e))?;

        for board in &boards {
            sqlx::query("INSERT INTO firmware_boards (firmware_id, board_name) VALUES (?, ?)")
                .bind(id.to_string())
                .bind(board)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        format!("Failed to assign board '{board}' to firmware {id}"),
                        e,
                    )
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit firmware", e))?;

        info!(firmware_id = %id, repo = %data.repo_name, boards = ?boards, "Firmware record created");

        let created_at = DateTime::<Utc>::from_timestamp_micros(created_at_us).unwrap_or(created_at);
        Ok(FirmwareRecord {
            id,
            repo_name: data.repo_name.clone(),
            commit_id: data.commit_id.clone(),
            boards,
            created_at,
            created_by: data.created_by.clone(),
            digest: String::new(),
            expected_digest: data.expected_digest.clone(),
            description: data.description.clone(),
            size: 0,
        })
    }

    /// Find a record by ID.
    pub async fn find_by_id(&self, id: &FirmwareId) -> AppResult<Option<FirmwareRecord>> {
        let row = sqlx::query_as::<_, FirmwareRow>(&format!(
            "SELECT {FIRMWARE_COLUMNS} FROM firmwares f WHERE f.id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find firmware", e))?;

        match row {
            Some(row) => {
                let boards = self.boards_for(&row.id).await?;
                row.into_record(boards).map(Some)
            }
            None => Ok(None),
        }
    }

    /// List every record, newest first.
    pub async fn list_all(&self) -> AppResult<Vec<FirmwareRecord>> {
        let rows = sqlx::query_as::<_, FirmwareRow>(&format!(
            "SELECT {FIRMWARE_COLUMNS} FROM firmwares f ORDER BY f.created_at DESC, f.id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list firmwares", e))?;

        let assignments: Vec<(String, String)> = sqlx::query_as(
            "SELECT firmware_id, board_name FROM firmware_boards ORDER BY firmware_id, board_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list boards", e))?;

        let mut boards: HashMap<String, Vec<String>> = HashMap::new();
        for (firmware_id, board_name) in assignments {
            boards.entry(firmware_id).or_default().push(board_name);
        }

        rows.into_iter()
            .map(|row| {
                let row_boards = boards.remove(&row.id).unwrap_or_default();
                row.into_record(row_boards)
            })
            .collect()
    }

    /// Newest shipped record of `repo_name` that targets `board_name`.
    ///
    /// Ties on `created_at` are broken by id, which is time ordered.
    pub async fn find_latest_for_board(
        &self,
        repo_name: &str,
        board_name: &str,
    ) -> AppResult<Option<FirmwareRecord>> {
        let row = sqlx::query_as::<_, FirmwareRow>(&format!(
            "SELECT {FIRMWARE_COLUMNS} FROM firmwares f \
             JOIN firmware_boards b ON b.firmware_id = f.id \
             WHERE f.repo_name = ? AND b.board_name = ? AND f.size != 0 \
             ORDER BY f.created_at DESC, f.id DESC LIMIT 1"
        ))
        .bind(repo_name)
        .bind(board_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query latest firmware", e)
        })?;

        match row {
            Some(row) => {
                let boards = self.boards_for(&row.id).await?;
                row.into_record(boards).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Attach binary info to a record that has none yet.
    ///
    /// Returns `false` when the record is missing or already carries a
    /// binary, so concurrent uploads resolve to a single winner.
    pub async fn update_binary_info(
        &self,
        id: &FirmwareId,
        digest: &str,
        size: i64,
    ) -> AppResult<bool> {
        if size <= 0 || digest.is_empty() {
            return Err(AppError::validation(
                "Binary info requires a non-empty digest and a positive size",
            ));
        }

        let result = sqlx::query("UPDATE firmwares SET digest = ?, size = ? WHERE id = ? AND size = 0")
            .bind(digest)
            .bind(size)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update binary info", e)
            })?;

        let updated = result.rows_affected() == 1;
        debug!(firmware_id = %id, updated, "Binary info update");
        Ok(updated)
    }

    async fn boards_for(&self, firmware_id: &str) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT board_name FROM firmware_boards WHERE firmware_id = ? ORDER BY board_name",
        )
        .bind(firmware_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load boards", e))
    }
}
