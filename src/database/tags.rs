// ABOUTME: Tag storage operations and the exercise-tag join table
// ABOUTME: Handles tag rows plus attaching and reading tag ids per exercise

use std::collections::HashMap;

use super::Database;
use crate::models::Tag;
use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

impl Database {
    /// Create the tags and exercises_tags tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_tags(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                title_en TEXT UNIQUE NOT NULL,
                title_ru TEXT UNIQUE NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises_tags (
                exercise_id INTEGER NOT NULL REFERENCES exercises(id),
                tag_id INTEGER NOT NULL REFERENCES tags(id),
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (exercise_id, tag_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_exercises_tags_tag ON exercises_tags(tag_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a tag and return the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the row cannot be read back
    pub async fn create_tag(&self, title_en: &str, title_ru: &str) -> Result<Tag> {
        let result = sqlx::query("INSERT INTO tags (title_en, title_ru) VALUES ($1, $2)")
            .bind(title_en)
            .bind(title_ru)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row_to_tag(&row))
    }

    /// All tags, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT * FROM tags ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_tag).collect())
    }

    /// Tag ids attached to one exercise, in attachment order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn tag_ids_for_exercise(&self, exercise_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT tag_id FROM exercises_tags WHERE exercise_id = $1 ORDER BY rowid",
        )
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Tag ids for many exercises at once, keyed by exercise id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn tag_ids_for_exercises(
        &self,
        exercise_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>> {
        if exercise_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = (1..=exercise_ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            r"
            SELECT exercise_id, tag_id FROM exercises_tags
            WHERE exercise_id IN ({placeholders})
            ORDER BY rowid
            "
        );

        let mut q = sqlx::query(&query);
        for id in exercise_ids {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let mut by_exercise: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in &rows {
            by_exercise
                .entry(row.get("exercise_id"))
                .or_default()
                .push(row.get("tag_id"));
        }
        Ok(by_exercise)
    }
}

/// Attach tags to an exercise; unknown tag ids fail the foreign key check
pub(crate) async fn add_tag_links<'e, E>(
    executor: E,
    exercise_id: i64,
    tag_ids: &[i64],
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut values = Vec::with_capacity(tag_ids.len());
    for (i, _) in tag_ids.iter().enumerate() {
        values.push(format!("($1, ${})", i + 2));
    }
    let query = format!(
        "INSERT INTO exercises_tags (exercise_id, tag_id) VALUES {}",
        values.join(", ")
    );

    let mut q = sqlx::query(&query).bind(exercise_id);
    for tag_id in tag_ids {
        q = q.bind(tag_id);
    }
    q.execute(executor).await?;
    Ok(())
}

/// Convert a database row to a Tag struct
fn row_to_tag(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        title_en: row.get("title_en"),
        title_ru: row.get("title_ru"),
    }
}
