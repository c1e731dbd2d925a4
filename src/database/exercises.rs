// ABOUTME: Exercise storage operations
// ABOUTME: Handles exercise rows, list filtering, soft deletion, and referrer lookups

use super::Database;
use crate::models::{Exercise, ExerciseListFilter};
use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

impl Database {
    /// Create the exercises table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_exercises(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                deleted_at DATETIME,
                title_en TEXT UNIQUE NOT NULL,
                title_ru TEXT UNIQUE NOT NULL,
                filename TEXT NOT NULL DEFAULT '',
                tips TEXT NOT NULL DEFAULT '[]'
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exercises_deleted_at ON exercises(deleted_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_exercises_updated_at ON exercises(updated_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get an exercise by id, including soft-deleted rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exercise_by_id(&self, id: i64) -> Result<Option<Exercise>> {
        find_exercise(&self.pool, id).await
    }

    /// List exercises per the filter precedence: block membership beats
    /// suggestion, which beats the plain `updated_at`-ordered listing
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_exercises(&self, filter: &ExerciseListFilter) -> Result<Vec<Exercise>> {
        if !filter.block_ids.is_empty() {
            return self.list_exercises_in_blocks(&filter.block_ids).await;
        }

        if !filter.suggestion.is_empty() {
            let rows = sqlx::query(
                r"
                SELECT * FROM exercises
                WHERE deleted_at IS NULL
                  AND (LOWER(title_en) LIKE $1 OR LOWER(title_ru) LIKE $1)
                ",
            )
            .bind(format!("%{}%", filter.suggestion.to_lowercase()))
            .fetch_all(&self.pool)
            .await?;
            return rows.iter().map(row_to_exercise).collect();
        }

        let query = format!(
            "SELECT * FROM exercises WHERE deleted_at IS NULL ORDER BY updated_at {}",
            filter.updated_at.as_sql()
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_exercise).collect()
    }

    /// List live exercises that appear in any of the given blocks
    async fn list_exercises_in_blocks(&self, block_ids: &[i64]) -> Result<Vec<Exercise>> {
        let placeholders = (1..=block_ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            r"
            SELECT DISTINCT e.* FROM exercises e
            INNER JOIN exercises_blocks eb ON eb.exercise_id = e.id
            WHERE eb.block_id IN ({placeholders}) AND e.deleted_at IS NULL
            "
        );

        let mut q = sqlx::query(&query);
        for id in block_ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_exercise).collect()
    }

    /// Fetch exercises by id, including soft-deleted rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exercises_by_ids(&self, ids: &[i64]) -> Result<Vec<Exercise>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT * FROM exercises WHERE id IN ({placeholders})");

        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_exercise).collect()
    }
}

/// Get an exercise by id, including soft-deleted rows
pub(crate) async fn find_exercise<'e, E>(executor: E, id: i64) -> Result<Option<Exercise>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT * FROM exercises WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(row_to_exercise).transpose()
}

/// Insert an exercise row and return its id
pub(crate) async fn insert_exercise<'e, E>(
    executor: E,
    title_en: &str,
    title_ru: &str,
    filename: &str,
    tips: &[String],
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r"
        INSERT INTO exercises (title_en, title_ru, filename, tips)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(title_en)
    .bind(title_ru)
    .bind(filename)
    .bind(serde_json::to_string(tips)?)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Persist title and tips changes; the caller decides the merge
pub(crate) async fn update_exercise_row<'e, E>(executor: E, exercise: &Exercise) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r"
        UPDATE exercises
        SET title_en = $2, title_ru = $3, tips = $4, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        ",
    )
    .bind(exercise.id)
    .bind(&exercise.title_en)
    .bind(&exercise.title_ru)
    .bind(serde_json::to_string(&exercise.tips)?)
    .execute(executor)
    .await?;
    Ok(())
}

/// First live block still containing the exercise, if any
pub(crate) async fn first_live_block_referencing<'e, E>(
    executor: E,
    exercise_id: i64,
) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let block_id = sqlx::query_scalar(
        r"
        SELECT b.id FROM blocks b
        INNER JOIN exercises_blocks eb ON eb.block_id = b.id
        WHERE eb.exercise_id = $1 AND b.deleted_at IS NULL
        ORDER BY b.id
        LIMIT 1
        ",
    )
    .bind(exercise_id)
    .fetch_optional(executor)
    .await?;

    Ok(block_id)
}

/// Soft-delete an exercise; returns false when it was already gone
pub(crate) async fn soft_delete_exercise<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result =
        sqlx::query("UPDATE exercises SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(executor)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Convert a database row to an Exercise struct
pub(crate) fn row_to_exercise(row: &SqliteRow) -> Result<Exercise> {
    let tips_json: String = row.get("tips");
    let tips: Vec<String> = serde_json::from_str(&tips_json)?;

    Ok(Exercise {
        id: row.get("id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted_at: row.get("deleted_at"),
        title_en: row.get("title_en"),
        title_ru: row.get("title_ru"),
        filename: row.get("filename"),
        tips,
    })
}

