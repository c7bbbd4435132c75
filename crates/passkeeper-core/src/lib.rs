// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the PassKeeper vault.
//!
//! This crate provides the error taxonomy, canonical entity types, and the
//! injected capability traits used throughout the PassKeeper workspace.
//! Higher layers (crypto, storage, vault) depend only on what is defined
//! here at their seams.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PassKeeperError;
pub use traits::{MemorySecureStore, SecureKeyValue};
pub use types::{Category, Credential, NewCategory, NewCredential, User, SYSTEM_USER_ID};
