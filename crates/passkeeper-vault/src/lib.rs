// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault services for PassKeeper: accounts, key material, and the portable
//! backup format.
//!
//! The vault composes the lower crates into user-facing operations. Key
//! material (one salt per user) lives in an injected [`SecureKeyValue`]
//! backend, never in the database; exports are double-encrypted envelopes
//! whose salt travels out of band; imports re-encrypt record by record
//! under the destination user's salt with per-record failure isolation.
//!
//! [`SecureKeyValue`]: passkeeper_core::SecureKeyValue

pub mod accounts;
pub mod auth_gate;
pub mod envelope;
pub mod export;
pub mod import;
pub mod keystore;

pub use accounts::AccountService;
pub use auth_gate::AuthGate;
pub use envelope::{ExportEnvelope, ExportPayload, FORMAT_VERSION};
pub use export::ExportCodec;
pub use import::{ImportPipeline, ImportReport};
pub use keystore::{KeyMaterialService, USER_SALT_KEY_PREFIX};
