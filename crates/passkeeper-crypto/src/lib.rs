// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic primitives for the PassKeeper vault.
//!
//! Secrets are encrypted per-record with AES-256-CBC under a key derived
//! from the user's salt via PBKDF2-HMAC-SHA256 (5000 rounds). The salt
//! itself lives only in the device secure store; the derived key is never
//! persisted and is recomputed on demand.

pub mod cipher;
pub mod kdf;
pub mod keys;

pub use cipher::{decrypt, encrypt, Encrypted};
pub use keys::{check_password, generate_random_password, generate_salt, hash_password};
