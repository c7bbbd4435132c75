// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the PassKeeper vault.

use thiserror::Error;

/// The primary error type used across all PassKeeper crates.
///
/// Per-record import failures are deliberately *not* represented here: the
/// import pipeline aggregates them into `ImportReport.errors` instead of
/// raising, so that one corrupted record cannot block recovery of the rest.
#[derive(Debug, Error)]
pub enum PassKeeperError {
    /// Configuration errors (invalid TOML, out-of-range retry parameters).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed ciphertext, IV, or salt combination. Decryption with the
    /// wrong key lands here -- never a silently corrupted plaintext.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// A salt or other key material was missing from the secure key-value store.
    #[error("key material not found under '{key}'")]
    KeyNotFound { key: String },

    /// The storage layer reported that another writer holds the lock.
    /// Transient -- the retry executor absorbs this up to its attempt budget.
    #[error("storage locked: {message}")]
    LockContention { message: String },

    /// Malformed or incompatible envelope structure. Fatal: raised before
    /// any write, the import transaction is never opened.
    #[error("validation error: {0}")]
    Validation(String),

    /// A transaction was rolled back because its commit failed.
    #[error("transaction aborted: {source}")]
    TransactionAbort {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An import is already running for this user.
    #[error("import already in progress for user {user_id}")]
    ImportInFlight { user_id: i64 },

    /// Storage backend errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Envelope file I/O errors.
    #[error("i/o error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PassKeeperError {
    /// Whether this error is a transient lock-contention failure that the
    /// retry executor may absorb. All other errors propagate immediately.
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, PassKeeperError::LockContention { .. })
    }
}
