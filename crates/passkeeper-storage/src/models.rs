// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity types stored in the database.
//!
//! The canonical definitions live in `passkeeper-core` so they can cross
//! crate boundaries without pulling in rusqlite; this module re-exports
//! them alongside the query layer that produces them.

pub use passkeeper_core::types::{
    Category, Credential, NewCategory, NewCredential, User, SYSTEM_USER_ID,
};
