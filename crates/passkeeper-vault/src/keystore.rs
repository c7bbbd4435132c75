// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user salt persistence in the device secure store.
//!
//! One salt per user, keyed `user_salt_<id>`. The salt is the root of the
//! user's encryption key and travels separately from any export envelope;
//! it is never written to the database and never logged.

use std::sync::Arc;

use tracing::debug;

use passkeeper_core::{PassKeeperError, SecureKeyValue};
use passkeeper_crypto::generate_salt;

pub const USER_SALT_KEY_PREFIX: &str = "user_salt_";

/// Salt lifecycle over an injected [`SecureKeyValue`] backend.
#[derive(Clone)]
pub struct KeyMaterialService {
    store: Arc<dyn SecureKeyValue>,
}

impl KeyMaterialService {
    pub fn new(store: Arc<dyn SecureKeyValue>) -> Self {
        Self { store }
    }

    fn salt_key(user_id: i64) -> String {
        format!("{USER_SALT_KEY_PREFIX}{user_id}")
    }

    /// Fetch the salt for a user. Absence is [`PassKeeperError::KeyNotFound`]:
    /// without the salt no stored ciphertext is recoverable, so callers must
    /// not paper over it.
    pub async fn salt_for_user(&self, user_id: i64) -> Result<String, PassKeeperError> {
        let key = Self::salt_key(user_id);
        self.store
            .get(&key)
            .await?
            .ok_or(PassKeeperError::KeyNotFound { key })
    }

    /// Persist a freshly generated salt for a new user. Overwrites any
    /// previous value, so this must only run at registration.
    pub async fn store_salt(&self, user_id: i64, salt: &str) -> Result<(), PassKeeperError> {
        self.store.set(&Self::salt_key(user_id), salt).await?;
        debug!(user_id, "salt stored");
        Ok(())
    }

    /// Generate and persist a fresh salt in one step.
    pub async fn create_salt_for_user(&self, user_id: i64) -> Result<String, PassKeeperError> {
        let salt = generate_salt()?;
        self.store_salt(user_id, &salt).await?;
        Ok(salt)
    }

    /// Remove a user's salt. All of that user's ciphertexts become
    /// unrecoverable; only account deletion calls this.
    pub async fn delete_salt_for_user(&self, user_id: i64) -> Result<(), PassKeeperError> {
        self.store.delete(&Self::salt_key(user_id)).await?;
        debug!(user_id, "salt deleted");
        Ok(())
    }

    /// The salt handed to the user alongside an export. The envelope itself
    /// never contains it; whoever imports must present it out of band.
    pub async fn export_salt(&self, user_id: i64) -> Result<String, PassKeeperError> {
        self.salt_for_user(user_id).await
    }
}
