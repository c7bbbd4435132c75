// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account lifecycle: registration, verification, password rotation.
//!
//! Passwords arrive as [`SecretString`] and are only ever exposed to the
//! hashing primitives. A password change recomputes the login digest under
//! the user's *existing* salt: the salt also derives the encryption key,
//! and rotating it would orphan every stored ciphertext.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use passkeeper_core::{PassKeeperError, User};
use passkeeper_crypto::{check_password, hash_password};
use passkeeper_storage::{queries::users, Database};

use crate::keystore::KeyMaterialService;

#[derive(Clone)]
pub struct AccountService {
    db: Database,
    keys: KeyMaterialService,
}

impl AccountService {
    pub fn new(db: Database, keys: KeyMaterialService) -> Self {
        Self { db, keys }
    }

    /// Create an account: unique username, fresh salt in the secure store,
    /// login digest in the database.
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<User, PassKeeperError> {
        if username.trim().is_empty() {
            return Err(PassKeeperError::Validation(
                "username must not be empty".into(),
            ));
        }
        if users::find_by_username(&self.db, username).await?.is_some() {
            return Err(PassKeeperError::Validation(format!(
                "username '{username}' is already taken"
            )));
        }

        // The digest needs the salt, and the salt key needs the row id, so
        // hash against a locally generated salt and persist it keyed by the
        // id the insert hands back.
        let salt = passkeeper_crypto::generate_salt()?;
        let auth_hash = hash_password(password.expose_secret(), &salt);
        let user = users::create(&self.db, username, &auth_hash).await?;
        self.keys.store_salt(user.id, &salt).await?;

        info!(user_id = user.id, "account registered");
        Ok(user)
    }

    /// Check a login attempt. Unknown usernames and wrong passwords both
    /// come back as `None`; callers must not distinguish them.
    pub async fn verify(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Option<User>, PassKeeperError> {
        let Some(user) = users::find_by_username(&self.db, username).await? else {
            debug!("login attempt for unknown username");
            return Ok(None);
        };
        let salt = self.keys.salt_for_user(user.id).await?;
        if check_password(password.expose_secret(), &user.auth_hash, &salt) {
            debug!(user_id = user.id, "login verified");
            Ok(Some(user))
        } else {
            debug!(user_id = user.id, "login rejected");
            Ok(None)
        }
    }

    /// Rotate the login password. The salt is kept: only the stored digest
    /// changes, ciphertexts stay decryptable.
    pub async fn change_password(
        &self,
        user_id: i64,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<(), PassKeeperError> {
        let user = users::find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| PassKeeperError::Validation(format!("user {user_id} does not exist")))?;
        let salt = self.keys.salt_for_user(user_id).await?;
        if !check_password(current.expose_secret(), &user.auth_hash, &salt) {
            return Err(PassKeeperError::Validation(
                "current password is incorrect".into(),
            ));
        }

        let new_hash = hash_password(new.expose_secret(), &salt);
        users::update_auth_hash(&self.db, user_id, &new_hash).await?;
        info!(user_id, "password changed");
        Ok(())
    }

    /// Delete an account after confirming the password. Categories and
    /// credentials cascade in the database; the salt is removed last so a
    /// failed row delete leaves the vault recoverable.
    pub async fn delete_account(
        &self,
        user_id: i64,
        password: &SecretString,
    ) -> Result<(), PassKeeperError> {
        let user = users::find_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| PassKeeperError::Validation(format!("user {user_id} does not exist")))?;
        let salt = self.keys.salt_for_user(user_id).await?;
        if !check_password(password.expose_secret(), &user.auth_hash, &salt) {
            return Err(PassKeeperError::Validation(
                "current password is incorrect".into(),
            ));
        }

        users::delete(&self.db, user_id).await?;
        self.keys.delete_salt_for_user(user_id).await?;
        info!(user_id, "account deleted");
        Ok(())
    }
}
