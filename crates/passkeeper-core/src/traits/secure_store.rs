// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secure key-value capability for device-backed key material storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::PassKeeperError;

/// Opaque secure key-value store, keyed by ASCII strings such as
/// `user_salt_<id>`.
///
/// On device this is backed by the platform keystore; values stored here
/// (salts) are never logged and never included in export envelopes.
#[async_trait]
pub trait SecureKeyValue: Send + Sync + 'static {
    /// Returns the stored value, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, PassKeeperError>;

    /// Stores a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), PassKeeperError>;

    /// Removes a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), PassKeeperError>;
}

/// In-memory [`SecureKeyValue`] implementation for tests and embedders
/// without a platform keystore.
#[derive(Default)]
pub struct MemorySecureStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureKeyValue for MemorySecureStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PassKeeperError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PassKeeperError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PassKeeperError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete_lifecycle() {
        let store = MemorySecureStore::new();

        assert!(store.get("user_salt_1").await.unwrap().is_none());

        store.set("user_salt_1", "c2FsdA==").await.unwrap();
        assert_eq!(
            store.get("user_salt_1").await.unwrap().as_deref(),
            Some("c2FsdA==")
        );

        store.delete("user_salt_1").await.unwrap();
        assert!(store.get("user_salt_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = MemorySecureStore::new();
        store.set("k", "old").await.unwrap();
        store.set("k", "new").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn delete_absent_key_is_noop() {
        let store = MemorySecureStore::new();
        store.delete("never-set").await.unwrap();
    }
}
