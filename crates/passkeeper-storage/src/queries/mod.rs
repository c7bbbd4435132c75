// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.
//!
//! Each module exposes async wrappers over `Database` for standalone
//! operations plus `pub(crate)`-ish connection-level primitives (suffixed
//! `_in`) that run against a borrowed `Connection`. A `rusqlite::Transaction`
//! derefs to `Connection`, so the primitives compose inside the transaction
//! phases of the import pipeline without opening their own transactions.

pub mod categories;
pub mod credentials;
pub mod users;
