// ABOUTME: Database access layer for the workout composition engine
// ABOUTME: Owns the SQLite pool, schema migrations, and per-entity query modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Database Management
//!
//! SQLite-backed storage for exercises, blocks, trainings, and their ordered
//! associations. Each entity keeps its queries in its own module as an
//! `impl Database` block; the composition flows that must stay atomic run
//! their statements through a [`TransactionGuard`].

pub(crate) mod blocks;
pub(crate) mod exercises;
pub(crate) mod tags;
pub(crate) mod trainings;
mod transactions;
pub(crate) mod users;

pub use transactions::TransactionGuard;

use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

/// Database manager for the composition engine
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open a connection pool and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, the database file cannot
    /// be created, or a migration statement fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // A pooled :memory: database exists per connection, so the pool must
        // be pinned to a single connection to keep one coherent schema.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Begin a transaction wrapped in a rollback-on-drop guard
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired from the pool
    pub async fn begin(&self) -> Result<TransactionGuard> {
        let tx = self.pool.begin().await?;
        Ok(TransactionGuard::new(tx))
    }

    /// Verify the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the probe query fails
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_exercises().await?;
        self.migrate_blocks().await?;
        self.migrate_trainings().await?;
        self.migrate_tags().await?;
        self.migrate_users().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) async fn create_test_db() -> Result<Database> {
        // Each :memory: pool is its own isolated instance
        Database::new("sqlite::memory:").await
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() -> Result<()> {
        let db = create_test_db().await?;
        db.migrate().await?;
        db.migrate().await?;
        Ok(())
    }
}
