// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a user salt.
//!
//! The encryption key is never persisted; it is recomputed on demand from
//! the base64 salt string held in the device secure store. The salt string
//! serves as both the password and the salt input to PBKDF2 -- a quirk of
//! the v1 envelope format that must be preserved so existing exports stay
//! decryptable.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Fixed iteration count for the v1 format.
pub const PBKDF2_ROUNDS: u32 = 5000;

/// Derive a 256-bit AES key from a base64 salt string.
///
/// Deterministic for a fixed salt. The returned key is wrapped in
/// [`Zeroizing`] for automatic memory zeroing on drop.
pub fn derive_key(salt: &str) -> Zeroizing<[u8; 32]> {
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2_hmac::<Sha256>(salt.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, key.as_mut());
    key
}
