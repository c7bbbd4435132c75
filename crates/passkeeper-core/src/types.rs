// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical entity types shared across the PassKeeper workspace.
//!
//! These mirror the relational schema consumed by the vault. Timestamps are
//! ISO-8601 strings produced by SQLite defaults; `secret` fields always hold
//! base64 ciphertext, never plaintext.

use serde::{Deserialize, Serialize};

/// Owner sentinel for system-wide immutable default categories. Rows owned
/// by this id are visible to every user and never exported.
pub const SYSTEM_USER_ID: i64 = 0;

/// A local account row. `auth_hash` is the SHA-256 login digest, not an
/// encryption key -- the encryption key is derived on demand from the salt
/// held in the secure key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub auth_hash: String,
    pub biometric: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A credential category. `key` is a stable symbolic id for built-ins and
/// travels through exports so imports can re-match them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub key: Option<String>,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    /// Whether this row is one of the immutable system defaults.
    pub fn is_system(&self) -> bool {
        self.user_id == SYSTEM_USER_ID
    }
}

/// A stored credential. `secret` is the per-record ciphertext; `iv` is the
/// initialization vector generated for that one encryption and must travel
/// with it -- decrypting under any other iv/salt combination fails loudly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub title: String,
    pub username: Option<String>,
    pub secret: String,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub category: Option<Category>,
    pub favorite: bool,
    pub iv: String,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload for a category row.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub key: Option<String>,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub user_id: i64,
}

/// Insert payload for a credential row. `secret` and `iv` must come from
/// the same encryption operation.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub title: String,
    pub username: Option<String>,
    pub secret: String,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<i64>,
    pub favorite: bool,
    pub iv: String,
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_category_detection() {
        let mut category = Category {
            id: 1,
            key: Some("work".into()),
            name: "Work".into(),
            icon: None,
            color: None,
            user_id: SYSTEM_USER_ID,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        };
        assert!(category.is_system());

        category.user_id = 7;
        assert!(!category.is_system());
    }

    #[test]
    fn credential_serializes_and_roundtrips() {
        let credential = Credential {
            id: 3,
            title: "GitHub".into(),
            username: Some("octocat".into()),
            secret: "b64-ciphertext".into(),
            website: None,
            notes: None,
            category: None,
            favorite: true,
            iv: "b64-iv".into(),
            user_id: 7,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_string(&credential).unwrap();
        let parsed: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(credential, parsed);
    }
}
