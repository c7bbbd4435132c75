// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Salt generation and password authentication hashing.
//!
//! The authentication hash is a single SHA-256 pass over password+salt,
//! while the encryption key uses 5000 rounds of PBKDF2 (see [`crate::kdf`]).
//! That asymmetry is part of the v1 format; changing it invalidates every
//! stored hash and needs a format-version bump.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

use passkeeper_core::PassKeeperError;

const SALT_LEN: usize = 16;

/// Charset for generated passwords.
const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_-+=<>?";

/// Generate a random 16-byte salt, base64-encoded.
///
/// One salt per user, held only in the device secure store. Never
/// deterministic, never logged, never included in an export envelope.
pub fn generate_salt() -> Result<String, PassKeeperError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| PassKeeperError::Internal("failed to generate random salt".to_string()))?;
    Ok(BASE64.encode(salt))
}

/// Hash a password for login comparison: hex SHA-256 of `password ++ salt`.
///
/// Deterministic for fixed inputs. Used only for authentication, never for
/// encryption key derivation.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password attempt against a stored hash.
///
/// The comparison is constant-time to avoid timing leaks.
pub fn check_password(input: &str, stored_hash: &str, salt: &str) -> bool {
    let computed = hash_password(input, salt);
    ring::constant_time::verify_slices_are_equal(computed.as_bytes(), stored_hash.as_bytes())
        .is_ok()
}

/// Generate a random password of `length` characters from the fixed charset.
pub fn generate_random_password(length: usize) -> Result<String, PassKeeperError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; length];
    rng.fill(&mut bytes)
        .map_err(|_| PassKeeperError::Internal("failed to generate random password".to_string()))?;

    Ok(bytes
        .iter()
        .map(|b| PASSWORD_CHARSET[*b as usize % PASSWORD_CHARSET.len()] as char)
        .collect())
}
