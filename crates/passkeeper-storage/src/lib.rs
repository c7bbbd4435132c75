// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the PassKeeper vault.
//!
//! A single tokio-rusqlite connection serializes all access; typed query
//! modules wrap the tables, and the retry executor absorbs transient lock
//! contention with exponential backoff. Schema lives in embedded refinery
//! migrations and is applied on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod retry;

pub use database::{channel_err, from_sqlite, Database};
pub use queries::credentials::CredentialUpdate;
pub use retry::{execute_in_transaction, execute_with_retry};
