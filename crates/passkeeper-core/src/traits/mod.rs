// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits injected into the vault components.
//!
//! The device secure store is an explicit capability rather than an
//! ambient global, so tests and embedders can substitute in-memory
//! implementations.

pub mod secure_store;

pub use secure_store::{MemorySecureStore, SecureKeyValue};
