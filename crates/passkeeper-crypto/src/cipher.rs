// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-CBC encryption of secret payloads.
//!
//! Every call to [`encrypt`] generates a fresh random 16-byte IV via the
//! system CSPRNG; the IV travels with its ciphertext and must be presented
//! together with the same salt on decryption. A wrong salt/IV combination
//! fails with a cipher error -- callers must treat any decryption failure
//! as a hard error, never as an empty string.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::rand::{SecureRandom, SystemRandom};

use passkeeper_core::PassKeeperError;

use crate::kdf;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Result of an [`encrypt`] call. Both fields are base64; the caller must
/// store them together to be able to decrypt later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encrypted {
    pub ciphertext: String,
    pub iv: String,
}

/// Encrypt a plaintext string under the key derived from `salt`.
///
/// CPU-only; no I/O. The same salt never reuses an IV: a fresh random one
/// is generated per call.
pub fn encrypt(plaintext: &str, salt: &str) -> Result<Encrypted, PassKeeperError> {
    let iv = generate_iv()?;
    let key = kdf::derive_key(salt);

    let cipher = Aes256CbcEnc::new_from_slices(key.as_ref(), &iv)
        .map_err(|_| PassKeeperError::Cipher("failed to initialize AES-256-CBC".to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    Ok(Encrypted {
        ciphertext: BASE64.encode(ciphertext),
        iv: BASE64.encode(iv),
    })
}

/// Decrypt a base64 ciphertext produced by [`encrypt`].
///
/// Any base64, length, padding, or UTF-8 failure is a
/// [`PassKeeperError::Cipher`]. CBC with PKCS7 padding has no
/// authentication tag, so the padding and UTF-8 checks are what reject a
/// wrong salt or IV.
pub fn decrypt(ciphertext: &str, salt: &str, iv: &str) -> Result<String, PassKeeperError> {
    let ciphertext = BASE64
        .decode(ciphertext)
        .map_err(|e| PassKeeperError::Cipher(format!("ciphertext is not valid base64: {e}")))?;
    let iv = BASE64
        .decode(iv)
        .map_err(|e| PassKeeperError::Cipher(format!("iv is not valid base64: {e}")))?;

    if iv.len() != IV_LEN {
        return Err(PassKeeperError::Cipher(format!(
            "iv must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(PassKeeperError::Cipher(format!(
            "ciphertext length {} is not a positive multiple of the block size",
            ciphertext.len()
        )));
    }

    let key = kdf::derive_key(salt);
    let cipher = Aes256CbcDec::new_from_slices(key.as_ref(), &iv)
        .map_err(|_| PassKeeperError::Cipher("failed to initialize AES-256-CBC".to_string()))?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| {
            PassKeeperError::Cipher(
                "decryption failed -- wrong salt, wrong iv, or corrupted ciphertext".to_string(),
            )
        })?;

    String::from_utf8(plaintext).map_err(|_| {
        PassKeeperError::Cipher("decrypted payload is not valid UTF-8".to_string())
    })
}

/// Generate a random 16-byte initialization vector.
fn generate_iv() -> Result<[u8; IV_LEN], PassKeeperError> {
    let rng = SystemRandom::new();
    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv)
        .map_err(|_| PassKeeperError::Cipher("failed to generate random iv".to_string()))?;
    Ok(iv)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT_A: &str = "AAAAAAAAAAAAAAAAAAAAAA==";
    const SALT_B: &str = "u7zLzPb+9kQhI5Ys2gX0lw==";

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let encrypted = encrypt("hunter2", SALT_A).unwrap();
        let decrypted = decrypt(&encrypted.ciphertext, SALT_A, &encrypted.iv).unwrap();
        assert_eq!(decrypted, "hunter2");
    }

    #[test]
    fn empty_string_roundtrips() {
        let encrypted = encrypt("", SALT_A).unwrap();
        let decrypted = decrypt(&encrypted.ciphertext, SALT_A, &encrypted.iv).unwrap();
        assert_eq!(decrypted, "");
    }

    #[test]
    fn non_ascii_roundtrips() {
        let plaintext = "contraseña: 秘密 🔐";
        let encrypted = encrypt(plaintext, SALT_B).unwrap();
        let decrypted = decrypt(&encrypted.ciphertext, SALT_B, &encrypted.iv).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn fresh_iv_per_encryption() {
        let e1 = encrypt("same input", SALT_A).unwrap();
        let e2 = encrypt("same input", SALT_A).unwrap();
        assert_ne!(e1.iv, e2.iv);
        assert_ne!(e1.ciphertext, e2.ciphertext);
    }

    #[test]
    fn wrong_salt_fails_loudly() {
        let encrypted = encrypt("the secret value to protect", SALT_A).unwrap();
        let result = decrypt(&encrypted.ciphertext, SALT_B, &encrypted.iv);
        assert!(matches!(result, Err(PassKeeperError::Cipher(_))));
    }

    #[test]
    fn wrong_iv_fails_loudly() {
        let encrypted = encrypt("another secret value entirely", SALT_A).unwrap();
        let wrong_iv = BASE64.encode([0x5au8; 16]);
        let result = decrypt(&encrypted.ciphertext, SALT_A, &wrong_iv);
        assert!(matches!(result, Err(PassKeeperError::Cipher(_))));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let encrypted = encrypt("integrity matters", SALT_A).unwrap();
        let mut raw = BASE64.decode(&encrypted.ciphertext).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        let result = decrypt(&BASE64.encode(raw), SALT_A, &encrypted.iv);
        assert!(matches!(result, Err(PassKeeperError::Cipher(_))));
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let result = decrypt(&BASE64.encode(b"short"), SALT_A, &BASE64.encode([0u8; 16]));
        assert!(matches!(result, Err(PassKeeperError::Cipher(_))));
    }

    #[test]
    fn malformed_base64_is_rejected() {
        let result = decrypt("not base64 !!!", SALT_A, "also not base64 !!!");
        assert!(matches!(result, Err(PassKeeperError::Cipher(_))));
    }
}
