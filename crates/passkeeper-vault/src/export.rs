// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export side of the portable backup format.
//!
//! The payload carries the user's own categories and credentials with ids
//! and timestamps stripped; system default categories stay home (their
//! names still appear on credential references and re-match on import).
//! Secrets are NOT re-encrypted: each keeps its stored ciphertext and IV,
//! and the whole payload gets one more AES pass under the user's salt.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use passkeeper_core::PassKeeperError;
use passkeeper_crypto::encrypt;
use passkeeper_storage::queries::{categories, credentials};
use passkeeper_storage::Database;

use crate::envelope::{
    CategoryRef, ExportEnvelope, ExportPayload, ExportedCategory, ExportedCredential,
    FORMAT_VERSION,
};

pub const EXPORT_FILE_EXTENSION: &str = "pkex";

#[derive(Clone)]
pub struct ExportCodec {
    db: Database,
}

impl ExportCodec {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Build the encrypted envelope for everything `user_id` owns.
    pub async fn export_user(
        &self,
        user_id: i64,
        user_salt: &str,
    ) -> Result<String, PassKeeperError> {
        let payload = self.collect_payload(user_id).await?;
        let category_count = payload.categories.len();
        let credential_count = payload.passwords.len();

        let encrypted = encrypt(&payload.to_json()?, user_salt)?;
        let envelope = ExportEnvelope {
            encrypted: encrypted.ciphertext,
            iv: encrypted.iv,
            version: FORMAT_VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };

        info!(
            user_id,
            categories = category_count,
            passwords = credential_count,
            "export envelope built"
        );
        envelope.to_json()
    }

    /// Write the envelope to `passkeeper_export_<timestamp>.pkex` under
    /// `dir` and return the full path.
    pub async fn export_to_file(
        &self,
        user_id: i64,
        user_salt: &str,
        dir: &Path,
    ) -> Result<PathBuf, PassKeeperError> {
        let envelope = self.export_user(user_id, user_salt).await?;
        // ISO timestamp with ':' and '.' flattened to '-' so the name is
        // filesystem-safe everywhere.
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
        let filename = format!("passkeeper_export_{timestamp}.{EXPORT_FILE_EXTENSION}");
        let path = dir.join(filename);
        tokio::fs::write(&path, envelope).await?;
        info!(user_id, path = %path.display(), "export written");
        Ok(path)
    }

    async fn collect_payload(&self, user_id: i64) -> Result<ExportPayload, PassKeeperError> {
        let categories = categories::find_for_user(&self.db, user_id)
            .await?
            .into_iter()
            .filter(|c| !c.is_system())
            .map(|c| ExportedCategory {
                name: c.name,
                key: c.key,
                icon: c.icon,
                color: c.color,
            })
            .collect();

        let passwords = credentials::find_for_user(&self.db, user_id)
            .await?
            .into_iter()
            .map(|c| ExportedCredential {
                title: c.title,
                username: c.username,
                password: c.secret,
                iv: c.iv,
                website: c.website,
                notes: c.notes,
                favorite: c.favorite,
                category: c.category.map(|cat| CategoryRef { name: cat.name }),
            })
            .collect();

        Ok(ExportPayload {
            categories,
            passwords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passkeeper_core::{NewCategory, NewCredential, SYSTEM_USER_ID};
    use passkeeper_crypto::decrypt;
    use passkeeper_storage::queries::users;
    use tempfile::tempdir;

    const SALT: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

    async fn seeded_db(dir: &tempfile::TempDir) -> (Database, i64) {
        let db = Database::open(dir.path().join("export.db").to_str().unwrap())
            .await
            .unwrap();
        let user = users::create(&db, "alice", "digest").await.unwrap();
        (db, user.id)
    }

    async fn add_credential(db: &Database, user_id: i64, title: &str, category_id: Option<i64>) {
        let encrypted = encrypt("hunter2", SALT).unwrap();
        credentials::create(
            db,
            NewCredential {
                title: title.into(),
                username: Some("octocat".into()),
                secret: encrypted.ciphertext,
                website: None,
                notes: None,
                category_id,
                favorite: false,
                iv: encrypted.iv,
                user_id,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn envelope_decrypts_back_to_the_payload() {
        let dir = tempdir().unwrap();
        let (db, user_id) = seeded_db(&dir).await;

        let work = categories::create(
            &db,
            NewCategory {
                key: None,
                name: "Work".into(),
                icon: None,
                color: None,
                user_id,
            },
        )
        .await
        .unwrap();
        add_credential(&db, user_id, "GitHub", Some(work.id)).await;

        let codec = ExportCodec::new(db);
        let envelope_json = codec.export_user(user_id, SALT).await.unwrap();
        let envelope = ExportEnvelope::parse(&envelope_json).unwrap();
        assert_eq!(envelope.version, FORMAT_VERSION);

        let payload_json = decrypt(&envelope.encrypted, SALT, &envelope.iv).unwrap();
        let payload = ExportPayload::parse(&payload_json).unwrap();
        assert_eq!(payload.categories.len(), 1);
        assert_eq!(payload.categories[0].name, "Work");
        assert_eq!(payload.passwords.len(), 1);
        assert_eq!(payload.passwords[0].title, "GitHub");
        assert_eq!(
            payload.passwords[0].category.as_ref().unwrap().name,
            "Work"
        );

        // The secret inside is still the per-record ciphertext.
        let secret = decrypt(
            &payload.passwords[0].password,
            SALT,
            &payload.passwords[0].iv,
        )
        .unwrap();
        assert_eq!(secret, "hunter2");
    }

    #[tokio::test]
    async fn system_categories_stay_home_but_their_names_travel() {
        let dir = tempdir().unwrap();
        let (db, user_id) = seeded_db(&dir).await;

        let system = categories::create(
            &db,
            NewCategory {
                key: Some("finance".into()),
                name: "Finance".into(),
                icon: None,
                color: None,
                user_id: SYSTEM_USER_ID,
            },
        )
        .await
        .unwrap();
        add_credential(&db, user_id, "Bank", Some(system.id)).await;

        let codec = ExportCodec::new(db);
        let envelope = ExportEnvelope::parse(&codec.export_user(user_id, SALT).await.unwrap()).unwrap();
        let payload = ExportPayload::parse(&decrypt(&envelope.encrypted, SALT, &envelope.iv).unwrap()).unwrap();

        assert!(payload.categories.is_empty(), "system rows must not export");
        assert_eq!(
            payload.passwords[0].category.as_ref().unwrap().name,
            "Finance"
        );
    }

    #[tokio::test]
    async fn export_to_file_writes_a_pkex_artifact() {
        let dir = tempdir().unwrap();
        let (db, user_id) = seeded_db(&dir).await;
        add_credential(&db, user_id, "GitHub", None).await;

        let codec = ExportCodec::new(db);
        let out = tempdir().unwrap();
        let path = codec.export_to_file(user_id, SALT, out.path()).await.unwrap();

        assert_eq!(path.extension().unwrap(), EXPORT_FILE_EXTENSION);

        // Name carries a sanitized ISO timestamp, safe on every filesystem.
        let stem = path.file_stem().unwrap().to_str().unwrap();
        let timestamp = stem.strip_prefix("passkeeper_export_").unwrap();
        assert!(timestamp.contains('T') && timestamp.ends_with('Z'));
        assert!(!timestamp.contains(':') && !timestamp.contains('.'));

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(ExportEnvelope::parse(&contents).is_ok());
    }

    #[tokio::test]
    async fn empty_vault_exports_an_empty_payload() {
        let dir = tempdir().unwrap();
        let (db, user_id) = seeded_db(&dir).await;

        let codec = ExportCodec::new(db);
        let envelope = ExportEnvelope::parse(&codec.export_user(user_id, SALT).await.unwrap()).unwrap();
        let payload = ExportPayload::parse(&decrypt(&envelope.encrypted, SALT, &envelope.iv).unwrap()).unwrap();
        assert!(payload.categories.is_empty());
        assert!(payload.passwords.is_empty());
    }
}
