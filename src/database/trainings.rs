// ABOUTME: Training storage operations and the training-block association table
// ABOUTME: Covers list filtering, link ordering, and soft deletion

use super::Database;
use crate::models::{ListFilter, Training, TrainingBlock};
use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

impl Database {
    /// Create the trainings and trainings_blocks tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_trainings(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at DATETIME,
                title_en TEXT NOT NULL DEFAULT '',
                title_ru TEXT NOT NULL DEFAULT '',
                draft BOOLEAN NOT NULL DEFAULT 1
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainings_blocks (
                training_id INTEGER NOT NULL REFERENCES trainings(id),
                block_id INTEGER NOT NULL REFERENCES blocks(id),
                block_order INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (training_id, block_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trainings_deleted_at ON trainings(deleted_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_trainings_blocks_block ON trainings_blocks(block_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a training by id, including soft-deleted rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn training_by_id(&self, id: i64) -> Result<Option<Training>> {
        find_training(&self.pool, id).await
    }

    /// Insert a training and return the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the row cannot be read back
    pub async fn create_training(&self, title_en: &str, title_ru: &str) -> Result<Training> {
        let result = sqlx::query(
            "INSERT INTO trainings (title_en, title_ru, draft) VALUES ($1, $2, 1)",
        )
        .bind(title_en)
        .bind(title_ru)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        find_training(&self.pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("training {id} vanished after insert"))
    }

    /// List trainings per the filter precedence: suggestion beats the
    /// draft/ready state filter, which beats the plain ordered listing
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_trainings(&self, filter: &ListFilter) -> Result<Vec<Training>> {
        if !filter.suggestion.is_empty() {
            let rows = sqlx::query(
                r"
                SELECT * FROM trainings
                WHERE deleted_at IS NULL
                  AND (LOWER(title_en) LIKE $1 OR LOWER(title_ru) LIKE $1)
                ",
            )
            .bind(format!("%{}%", filter.suggestion.to_lowercase()))
            .fetch_all(&self.pool)
            .await?;
            return rows.iter().map(row_to_training).collect();
        }

        let state_clause = match filter.state.as_str() {
            "draft" => "AND draft = 1",
            "ready" => "AND draft = 0",
            _ => "",
        };
        let query = format!(
            "SELECT * FROM trainings WHERE deleted_at IS NULL {state_clause} ORDER BY updated_at {}",
            filter.updated_at.as_sql()
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_training).collect()
    }

    /// Flip the draft flag; returns the training or `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn toggle_training_draft(&self, id: i64) -> Result<Option<Training>> {
        let result = sqlx::query(
            r"
            UPDATE trainings
            SET draft = NOT draft, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        find_training(&self.pool, id).await
    }

    /// Soft-delete a training; returns false when it was already gone
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_training(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE trainings SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ordered association rows for one training
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn block_links(&self, training_id: i64) -> Result<Vec<TrainingBlock>> {
        links_for_training(&self.pool, training_id).await
    }

    /// Association rows for many trainings, ordered within each training
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn block_links_for_trainings(
        &self,
        training_ids: &[i64],
    ) -> Result<Vec<TrainingBlock>> {
        if training_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=training_ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            r"
            SELECT * FROM trainings_blocks
            WHERE training_id IN ({placeholders})
            ORDER BY training_id, block_order
            "
        );

        let mut q = sqlx::query(&query);
        for id in training_ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_training_block).collect())
    }
}

/// Get a training by id, including soft-deleted rows
pub(crate) async fn find_training<'e, E>(executor: E, id: i64) -> Result<Option<Training>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT * FROM trainings WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(row_to_training).transpose()
}

/// Persist title changes; the caller decides the merge
pub(crate) async fn update_training_row<'e, E>(executor: E, training: &Training) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r"
        UPDATE trainings
        SET title_en = $2, title_ru = $3, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        ",
    )
    .bind(training.id)
    .bind(&training.title_en)
    .bind(&training.title_ru)
    .execute(executor)
    .await?;
    Ok(())
}

/// Link a block into a training at the next free order slot
///
/// The next order is computed in the same statement as the insert; two adds
/// to one training never claim the same position.
pub(crate) async fn insert_block_link<'e, E>(
    executor: E,
    training_id: i64,
    block_id: i64,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r"
        INSERT INTO trainings_blocks (training_id, block_id, block_order)
        SELECT $1, $2, COALESCE(MAX(block_order) + 1, 0)
        FROM trainings_blocks WHERE training_id = $1
        ",
    )
    .bind(training_id)
    .bind(block_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Unlink a block from a training; returns false when no row existed
pub(crate) async fn delete_block_link<'e, E>(
    executor: E,
    training_id: i64,
    block_id: i64,
) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result =
        sqlx::query("DELETE FROM trainings_blocks WHERE training_id = $1 AND block_id = $2")
            .bind(training_id)
            .bind(block_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Ordered association rows for one training
pub(crate) async fn links_for_training<'e, E>(
    executor: E,
    training_id: i64,
) -> Result<Vec<TrainingBlock>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT * FROM trainings_blocks WHERE training_id = $1 ORDER BY block_order",
    )
    .bind(training_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(row_to_training_block).collect())
}

/// Convert a database row to a Training struct
pub(crate) fn row_to_training(row: &SqliteRow) -> Result<Training> {
    Ok(Training {
        id: row.get("id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted_at: row.get("deleted_at"),
        title_en: row.get("title_en"),
        title_ru: row.get("title_ru"),
        draft: row.get("draft"),
    })
}

/// Convert a database row to an association struct
pub(crate) fn row_to_training_block(row: &SqliteRow) -> TrainingBlock {
    TrainingBlock {
        training_id: row.get("training_id"),
        block_id: row.get("block_id"),
        block_order: row.get("block_order"),
        created_at: row.get("created_at"),
    }
}
