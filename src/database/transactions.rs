// ABOUTME: Transaction management with an RAII guard for multi-statement flows
// ABOUTME: Rolls back automatically on drop unless the guard is explicitly committed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! RAII transaction guard
//!
//! Composition flows touch several tables under one transaction (existence
//! checks, capacity counts, association writes). The guard makes the happy
//! path explicit and turns every early `?` return into a rollback:
//!
//! ```text
//! let mut guard = db.begin().await?;
//! sqlx::query("INSERT ...").execute(guard.executor()?).await?;
//! sqlx::query("UPDATE ...").execute(guard.executor()?).await?;
//! guard.commit().await?;
//! ```

use sqlx::sqlite::SqliteConnection;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// RAII guard ensuring a transaction is rolled back unless committed
///
/// Wraps a `SQLx` transaction and provides:
/// - Automatic rollback if the guard is dropped without `commit()`
/// - A commit that consumes the guard, preventing double-commit
pub struct TransactionGuard {
    transaction: Option<Transaction<'static, Sqlite>>,
    committed: bool,
}

impl TransactionGuard {
    /// Wrap a transaction obtained from `pool.begin()`
    #[must_use]
    pub fn new(transaction: Transaction<'static, Sqlite>) -> Self {
        debug!("transaction guard created; will auto-rollback if not committed");
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already consumed or the
    /// database commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("transaction commit failed: {e}")))?;
                self.committed = true;
                debug!("transaction committed");
                Ok(())
            }
            None => Err(AppError::internal(
                "transaction already consumed - cannot commit",
            )),
        }
    }

    /// Explicitly roll back the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback operation fails
    pub async fn rollback(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(format!("transaction rollback failed: {e}")))?;
                debug!("transaction rolled back explicitly");
                Ok(())
            }
            None => Err(AppError::internal(
                "transaction already consumed - cannot rollback",
            )),
        }
    }

    /// Get the underlying connection for executing queries
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction has already been committed or
    /// rolled back
    pub fn executor(&mut self) -> AppResult<&mut SqliteConnection> {
        self.transaction
            .as_deref_mut()
            .ok_or_else(|| AppError::internal("transaction already consumed - guard is spent"))
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            // SQLx rolls the dropped transaction back; early error returns land here
            debug!("transaction guard dropped without commit; rolling back");
        }
    }
}
