// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread: the `Database` struct IS the single logical writer. Query modules
//! accept `&Database` and call through `connection().call()`. Do NOT create
//! additional Connection instances for writes.

use passkeeper_core::PassKeeperError;
use passkeeper_config::StorageConfig;
use tracing::debug;

use crate::migrations::run_migrations;

/// Closure result shape used with `connection().call()`: the outer
/// `Result` is the call channel (rusqlite/connection failures), the inner
/// one carries already-classified domain errors out of the closure.
pub(crate) type CallResult<T> = Result<Result<T, PassKeeperError>, rusqlite::Error>;

/// Handle to the SQLite database backing the vault.
///
/// Cloning is cheap and shares the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// pending migrations. WAL mode is enabled.
    pub async fn open(path: &str) -> Result<Self, PassKeeperError> {
        Self::open_internal(path, true).await
    }

    /// Open the database using the storage configuration section.
    pub async fn open_with_config(config: &StorageConfig) -> Result<Self, PassKeeperError> {
        Self::open_internal(&config.database_path, config.wal_mode).await
    }

    async fn open_internal(path: &str, wal_mode: bool) -> Result<Self, PassKeeperError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| channel_err(e.into()))?;

        conn.call(move |conn| -> CallResult<()> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            Ok(run_migrations(conn))
        })
        .await
        .map_err(channel_err)??;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL before the handle is dropped.
    pub async fn close(&self) -> Result<(), PassKeeperError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(channel_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Classify a rusqlite error at its source: busy/locked responses become
/// retryable [`PassKeeperError::LockContention`], everything else is a
/// plain storage error.
pub fn from_sqlite(e: rusqlite::Error) -> PassKeeperError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
            PassKeeperError::LockContention {
                message: e.to_string(),
            }
        }
        _ => PassKeeperError::Storage {
            source: Box::new(e),
        },
    }
}

/// Convert call-channel failures (connection closed, thread panic, or a
/// rusqlite error escaping the closure) into a storage error.
pub fn channel_err(e: tokio_rusqlite::Error) -> PassKeeperError {
    PassKeeperError::Storage {
        source: Box::new(e),
    }
}
