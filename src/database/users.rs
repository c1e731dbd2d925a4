// ABOUTME: User and session storage operations
// ABOUTME: Handles account rows plus token-per-session bookkeeping for login state

use super::Database;
use crate::models::{Session, User};
use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};
use uuid::Uuid;

impl Database {
    /// Create the users and sessions tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                login TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get a user by login name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn user_by_login(&self, login: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Look up a session by its token
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn session_by_token(&self, token: &str) -> Result<Option<Session>> {
        find_session(&self.pool, token).await
    }
}

/// Total registered user count
pub(crate) async fn count_users<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Insert a user row and return its id
pub(crate) async fn insert_user<'e, E>(executor: E, login: &str, password_hash: &str) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT INTO users (login, password_hash) VALUES ($1, $2)")
        .bind(login)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Insert a session row carrying the given token
pub(crate) async fn insert_session<'e, E>(executor: E, token: Uuid, user_id: i64) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO sessions (id, user_id) VALUES ($1, $2)")
        .bind(token.to_string())
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Remove every session belonging to the user
pub(crate) async fn delete_sessions_for_user<'e, E>(executor: E, user_id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Look up a session by its token
pub(crate) async fn find_session<'e, E>(executor: E, token: &str) -> Result<Option<Session>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT * FROM sessions WHERE id = $1")
        .bind(token)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(row_to_session).transpose()
}

/// Convert a database row to a User struct
fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.get("id"),
        created_at: row.get("created_at"),
        login: row.get("login"),
        password_hash: row.get("password_hash"),
    })
}

/// Convert a database row to a Session struct
fn row_to_session(row: &SqliteRow) -> Result<Session> {
    let id: String = row.get("id");
    Ok(Session {
        id: Uuid::parse_str(&id)?,
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    })
}
