// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Import side of the portable backup format.
//!
//! The pipeline is fail-fast up to the first write and fail-soft after:
//! envelope parsing, payload decryption, and shape validation abort the
//! whole import, while per-record failures are collected into the report so
//! one corrupted credential cannot block recovery of the rest. Writes run
//! in two transactions -- categories first, then credentials against the
//! committed category set. Each secret is decrypted with the import salt
//! and the IV it traveled with, then re-encrypted under the destination
//! salt with a fresh IV.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

use passkeeper_config::RetryConfig;
use passkeeper_core::{NewCategory, NewCredential, PassKeeperError};
use passkeeper_crypto::{decrypt, encrypt};
use passkeeper_storage::queries::{categories, credentials};
use passkeeper_storage::{execute_in_transaction, Database};

use crate::envelope::{ExportEnvelope, ExportPayload};

/// Outcome of an import. `success` is true only when every record landed;
/// a partial import still reports what it managed to bring in.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub imported_categories: usize,
    pub imported_passwords: usize,
    pub errors: Vec<String>,
}

#[derive(Clone)]
pub struct ImportPipeline {
    db: Database,
    retry: RetryConfig,
    in_flight: Arc<Mutex<HashSet<i64>>>,
}

/// Clears the per-user slot when the import finishes, however it finishes.
#[derive(Debug)]
struct InFlightGuard {
    users: Arc<Mutex<HashSet<i64>>>,
    user_id: i64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut users) = self.users.lock() {
            users.remove(&self.user_id);
        }
    }
}

impl ImportPipeline {
    pub fn new(db: Database, retry: RetryConfig) -> Self {
        Self {
            db,
            retry,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn begin(&self, user_id: i64) -> Result<InFlightGuard, PassKeeperError> {
        let mut users = self
            .in_flight
            .lock()
            .map_err(|_| PassKeeperError::Internal("import guard poisoned".into()))?;
        if !users.insert(user_id) {
            return Err(PassKeeperError::ImportInFlight { user_id });
        }
        Ok(InFlightGuard {
            users: Arc::clone(&self.in_flight),
            user_id,
        })
    }

    /// Import an envelope for `user_id`. `import_salt` opens the envelope
    /// (it came with the export, out of band); `destination_salt` is the
    /// importing user's own salt that everything is re-encrypted under.
    pub async fn import_user_data(
        &self,
        user_id: i64,
        envelope_json: &str,
        import_salt: &str,
        destination_salt: &str,
    ) -> Result<ImportReport, PassKeeperError> {
        let _guard = self.begin(user_id)?;

        let envelope = ExportEnvelope::parse(envelope_json)?;
        let payload_json = decrypt(&envelope.encrypted, import_salt, &envelope.iv)?;
        let payload = ExportPayload::parse(&payload_json)?;

        let mut errors = Vec::new();

        let imported_categories = self.category_phase(user_id, &payload, &mut errors).await?;
        let imported_passwords = self
            .credential_phase(user_id, &payload, import_salt, destination_salt, &mut errors)
            .await?;

        let report = ImportReport {
            success: errors.is_empty(),
            imported_categories,
            imported_passwords,
            errors,
        };
        if report.success {
            info!(
                user_id,
                imported_categories = report.imported_categories,
                imported_passwords = report.imported_passwords,
                "import complete"
            );
        } else {
            warn!(
                user_id,
                imported_categories = report.imported_categories,
                imported_passwords = report.imported_passwords,
                failed = report.errors.len(),
                "import completed with failures"
            );
        }
        Ok(report)
    }

    /// Read a `.pkex` artifact and import it.
    pub async fn import_from_file(
        &self,
        user_id: i64,
        path: &Path,
        import_salt: &str,
        destination_salt: &str,
    ) -> Result<ImportReport, PassKeeperError> {
        let envelope_json = tokio::fs::read_to_string(path).await?;
        self.import_user_data(user_id, &envelope_json, import_salt, destination_salt)
            .await
    }

    /// One transaction: match incoming categories by name against what the
    /// user can already see (own rows plus system defaults), create the
    /// missing ones. Per-item failures stay inside the transaction; only
    /// lock contention aborts it for a retry.
    async fn category_phase(
        &self,
        user_id: i64,
        payload: &ExportPayload,
        errors: &mut Vec<String>,
    ) -> Result<usize, PassKeeperError> {
        if payload.categories.is_empty() {
            return Ok(0);
        }
        let incoming = payload.categories.clone();

        let (created, phase_errors) =
            execute_in_transaction(&self.db, &self.retry, move |tx| {
                let existing = categories::find_for_user_in(tx, user_id)?;
                let mut known: HashSet<String> =
                    existing.into_iter().map(|c| c.name).collect();
                let mut created = 0usize;
                let mut errors = Vec::new();
                for category in &incoming {
                    if category.name.trim().is_empty() {
                        errors.push("category with empty name skipped".to_string());
                        continue;
                    }
                    if known.contains(&category.name) {
                        continue;
                    }
                    let row = NewCategory {
                        key: category.key.clone(),
                        name: category.name.clone(),
                        icon: category.icon.clone(),
                        color: category.color.clone(),
                        user_id,
                    };
                    match categories::insert_in(tx, &row) {
                        Ok(_) => {
                            known.insert(category.name.clone());
                            created += 1;
                        }
                        Err(e) if e.is_lock_contention() => return Err(e),
                        Err(e) => errors.push(format!("category '{}': {e}", category.name)),
                    }
                }
                Ok((created, errors))
            })
            .await?;

        errors.extend(phase_errors);
        Ok(created)
    }

    /// Re-encrypt each secret outside the transaction, then insert the
    /// prepared rows in one transaction with per-item isolation. Category
    /// references resolve by name against the committed set; the user's own
    /// row wins over a system default with the same name.
    async fn credential_phase(
        &self,
        user_id: i64,
        payload: &ExportPayload,
        import_salt: &str,
        destination_salt: &str,
        errors: &mut Vec<String>,
    ) -> Result<usize, PassKeeperError> {
        if payload.passwords.is_empty() {
            return Ok(0);
        }

        let visible = categories::find_for_user(&self.db, user_id).await?;
        let mut category_ids: HashMap<String, i64> = HashMap::new();
        for category in visible.iter().filter(|c| c.is_system()) {
            category_ids.insert(category.name.clone(), category.id);
        }
        for category in visible.iter().filter(|c| !c.is_system()) {
            category_ids.insert(category.name.clone(), category.id);
        }

        let mut prepared: Vec<NewCredential> = Vec::new();
        for item in &payload.passwords {
            let plaintext = match decrypt(&item.password, import_salt, &item.iv) {
                Ok(plaintext) => plaintext,
                Err(e) => {
                    errors.push(format!("credential '{}': {e}", item.title));
                    continue;
                }
            };
            let encrypted = match encrypt(&plaintext, destination_salt) {
                Ok(encrypted) => encrypted,
                Err(e) => {
                    errors.push(format!("credential '{}': {e}", item.title));
                    continue;
                }
            };
            prepared.push(NewCredential {
                title: item.title.clone(),
                username: item.username.clone(),
                secret: encrypted.ciphertext,
                website: item.website.clone(),
                notes: item.notes.clone(),
                category_id: item
                    .category
                    .as_ref()
                    .and_then(|r| category_ids.get(&r.name).copied()),
                favorite: item.favorite,
                iv: encrypted.iv,
                user_id,
            });
        }

        if prepared.is_empty() {
            return Ok(0);
        }

        let rows = prepared;
        let (inserted, phase_errors) =
            execute_in_transaction(&self.db, &self.retry, move |tx| {
                let mut inserted = 0usize;
                let mut errors = Vec::new();
                for row in &rows {
                    match credentials::insert_in(tx, row) {
                        Ok(_) => inserted += 1,
                        Err(e) if e.is_lock_contention() => return Err(e),
                        Err(e) => errors.push(format!("credential '{}': {e}", row.title)),
                    }
                }
                Ok((inserted, errors))
            })
            .await?;

        errors.extend(phase_errors);
        Ok(inserted)
    }
}
