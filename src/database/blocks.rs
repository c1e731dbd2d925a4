// ABOUTME: Block storage operations and the block-exercise association table
// ABOUTME: Covers list filtering, link ordering, capacity counts, and soft deletion

use super::Database;
use crate::models::{Block, ExerciseBlock, ListFilter, Side};
use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

impl Database {
    /// Create the blocks and exercises_blocks tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_blocks(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS blocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at DATETIME,
                title_en TEXT UNIQUE NOT NULL,
                title_ru TEXT UNIQUE NOT NULL,
                total_duration INTEGER NOT NULL DEFAULT 0,
                on_time INTEGER NOT NULL DEFAULT 0,
                relax_time INTEGER NOT NULL DEFAULT 0,
                draft BOOLEAN NOT NULL DEFAULT 1
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises_blocks (
                block_id INTEGER NOT NULL REFERENCES blocks(id),
                exercise_id INTEGER NOT NULL REFERENCES exercises(id),
                exercise_order INTEGER NOT NULL DEFAULT 0,
                side TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (block_id, exercise_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_blocks_deleted_at ON blocks(deleted_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exercises_blocks_exercise ON exercises_blocks(exercise_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a block by id, including soft-deleted rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn block_by_id(&self, id: i64) -> Result<Option<Block>> {
        find_block(&self.pool, id).await
    }

    /// Insert a block with already-fitted timing and return the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the row cannot be read back
    pub async fn create_block(
        &self,
        title_en: &str,
        title_ru: &str,
        total_duration: u8,
        on_time: u8,
        relax_time: u8,
    ) -> Result<Block> {
        let result = sqlx::query(
            r"
            INSERT INTO blocks (title_en, title_ru, total_duration, on_time, relax_time, draft)
            VALUES ($1, $2, $3, $4, $5, 1)
            ",
        )
        .bind(title_en)
        .bind(title_ru)
        .bind(i64::from(total_duration))
        .bind(i64::from(on_time))
        .bind(i64::from(relax_time))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        find_block(&self.pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("block {id} vanished after insert"))
    }

    /// List blocks per the filter precedence: suggestion beats the draft/ready
    /// state filter, which beats the plain `updated_at`-ordered listing
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_blocks(&self, filter: &ListFilter) -> Result<Vec<Block>> {
        if !filter.suggestion.is_empty() {
            let rows = sqlx::query(
                r"
                SELECT * FROM blocks
                WHERE deleted_at IS NULL
                  AND (LOWER(title_en) LIKE $1 OR LOWER(title_ru) LIKE $1)
                ",
            )
            .bind(format!("%{}%", filter.suggestion.to_lowercase()))
            .fetch_all(&self.pool)
            .await?;
            return rows.iter().map(row_to_block).collect();
        }

        let state_clause = match filter.state.as_str() {
            "draft" => "AND draft = 1",
            "ready" => "AND draft = 0",
            _ => "",
        };
        let query = format!(
            "SELECT * FROM blocks WHERE deleted_at IS NULL {state_clause} ORDER BY updated_at {}",
            filter.updated_at.as_sql()
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_block).collect()
    }

    /// Flip the draft flag; returns the block or `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn toggle_block_draft(&self, id: i64) -> Result<Option<Block>> {
        let result = sqlx::query(
            r"
            UPDATE blocks
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
        find_block(&self.pool, id).await
    }

    /// Fetch blocks by id, including soft-deleted rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn blocks_by_ids(&self, ids: &[i64]) -> Result<Vec<Block>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT * FROM blocks WHERE id IN ({placeholders})");

        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_block).collect()
    }

    /// Ordered association rows for one block
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exercise_links(&self, block_id: i64) -> Result<Vec<ExerciseBlock>> {
        links_for_block(&self.pool, block_id).await
    }

    /// Association rows for many blocks, ordered within each block
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exercise_links_for_blocks(&self, block_ids: &[i64]) -> Result<Vec<ExerciseBlock>> {
        if block_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=block_ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            r"
            SELECT * FROM exercises_blocks
            WHERE block_id IN ({placeholders})
            ORDER BY block_id, exercise_order
            "
        );

        let mut q = sqlx::query(&query);
        for id in block_ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_exercise_block).collect())
    }
}

/// Get a block by id, including soft-deleted rows
pub(crate) async fn find_block<'e, E>(executor: E, id: i64) -> Result<Option<Block>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT * FROM blocks WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(row_to_block).transpose()
}

/// Persist title, timing, and draft changes; the caller decides the merge
pub(crate) async fn update_block_row<'e, E>(executor: E, block: &Block) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r"
        UPDATE blocks
        SET title_en = $2, title_ru = $3, total_duration = $4, on_time = $5,
            relax_time = $6, draft = $7, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        ",
    )
    .bind(block.id)
    .bind(&block.title_en)
    .bind(&block.title_ru)
    .bind(i64::from(block.total_duration))
    .bind(i64::from(block.on_time))
    .bind(i64::from(block.relax_time))
    .bind(block.draft)
    .execute(executor)
    .await?;
    Ok(())
}

/// Number of exercise slots currently linked to the block
pub(crate) async fn count_exercise_links<'e, E>(executor: E, block_id: i64) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM exercises_blocks WHERE block_id = $1")
        .bind(block_id)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Link an exercise into a block at the next free order slot
///
/// The next order is computed in the same statement as the insert; two adds
/// to one block never claim the same position.
pub(crate) async fn insert_exercise_link<'e, E>(
    executor: E,
    block_id: i64,
    exercise_id: i64,
    side: Side,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r"
        INSERT INTO exercises_blocks (block_id, exercise_id, exercise_order, side)
        SELECT $1, $2, COALESCE(MAX(exercise_order) + 1, 0), $3
        FROM exercises_blocks WHERE block_id = $1
        ",
    )
    .bind(block_id)
    .bind(exercise_id)
    .bind(side.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

/// Unlink an exercise from a block; returns false when no row existed
pub(crate) async fn delete_exercise_link<'e, E>(
    executor: E,
    block_id: i64,
    exercise_id: i64,
) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result =
        sqlx::query("DELETE FROM exercises_blocks WHERE block_id = $1 AND exercise_id = $2")
            .bind(block_id)
            .bind(exercise_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove every exercise link owned by the block
pub(crate) async fn delete_exercise_links_for_block<'e, E>(
    executor: E,
    block_id: i64,
) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM exercises_blocks WHERE block_id = $1")
        .bind(block_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Ordered association rows for one block
pub(crate) async fn links_for_block<'e, E>(executor: E, block_id: i64) -> Result<Vec<ExerciseBlock>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT * FROM exercises_blocks WHERE block_id = $1 ORDER BY exercise_order",
    )
    .bind(block_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(row_to_exercise_block).collect())
}

/// First live training still containing the block, if any
pub(crate) async fn first_live_training_referencing<'e, E>(
    executor: E,
    block_id: i64,
) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let training_id = sqlx::query_scalar(
        r"
        SELECT t.id FROM trainings t
        INNER JOIN trainings_blocks tb ON tb.training_id = t.id
        WHERE tb.block_id = $1 AND t.deleted_at IS NULL
        ORDER BY t.id
        LIMIT 1
        ",
    )
    .bind(block_id)
    .fetch_optional(executor)
    .await?;

    Ok(training_id)
}

/// Soft-delete a block; returns false when it was already gone
pub(crate) async fn soft_delete_block<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE blocks SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Convert a database row to a Block struct
pub(crate) fn row_to_block(row: &SqliteRow) -> Result<Block> {
    Ok(Block {
        id: row.get("id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted_at: row.get("deleted_at"),
        title_en: row.get("title_en"),
        title_ru: row.get("title_ru"),
        total_duration: u8::try_from(row.get::<i64, _>("total_duration"))?,
        on_time: u8::try_from(row.get::<i64, _>("on_time"))?,
        relax_time: u8::try_from(row.get::<i64, _>("relax_time"))?,
        draft: row.get("draft"),
    })
}

/// Convert a database row to an association struct
pub(crate) fn row_to_exercise_block(row: &SqliteRow) -> ExerciseBlock {
    let side: String = row.get("side");
    ExerciseBlock {
        block_id: row.get("block_id"),
        exercise_id: row.get("exercise_id"),
        exercise_order: row.get("exercise_order"),
        side: Side::parse(&side),
        created_at: row.get("created_at"),
    }
}
