// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential rows.
//!
//! Only the `password` column is ciphertext; title, username, website, and
//! notes are stored in the clear so search can run server-side. Every read
//! joins the owning category so callers get a fully hydrated record in one
//! round trip.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use passkeeper_core::PassKeeperError;

use crate::database::{channel_err, from_sqlite, CallResult, Database};
use crate::models::{Category, Credential, NewCredential};

const CREDENTIAL_SELECT: &str = "\
    SELECT p.id, p.title, p.username, p.password, p.website, p.notes,
           p.favorite, p.iv, p.user_id, p.created_at, p.updated_at,
           c.id, c.key, c.name, c.icon, c.color, c.user_id, c.created_at, c.updated_at
    FROM passwords p
    LEFT JOIN categories c ON c.id = p.category_id";

// Column order fixed by CREDENTIAL_SELECT; the joined category is present
// exactly when its id column is non-null.
fn map_credential(row: &Row<'_>) -> Result<Credential, rusqlite::Error> {
    let category = match row.get::<_, Option<i64>>(11)? {
        Some(id) => Some(Category {
            id,
            key: row.get(12)?,
            name: row.get(13)?,
            icon: row.get(14)?,
            color: row.get(15)?,
            user_id: row.get(16)?,
            created_at: row.get(17)?,
            updated_at: row.get(18)?,
        }),
        None => None,
    };
    Ok(Credential {
        id: row.get(0)?,
        title: row.get(1)?,
        username: row.get(2)?,
        secret: row.get(3)?,
        website: row.get(4)?,
        notes: row.get(5)?,
        category,
        favorite: row.get(6)?,
        iv: row.get(7)?,
        user_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn query_credentials<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Credential>, PassKeeperError> {
    let mut stmt = conn.prepare(sql).map_err(from_sqlite)?;
    let rows = stmt.query_map(params, map_credential).map_err(from_sqlite)?;
    let mut credentials = Vec::new();
    for row in rows {
        credentials.push(row.map_err(from_sqlite)?);
    }
    Ok(credentials)
}

/// Connection-level insert, usable inside an open transaction.
pub fn insert_in(conn: &Connection, credential: &NewCredential) -> Result<i64, PassKeeperError> {
    conn.execute(
        "INSERT INTO passwords
             (title, username, password, website, notes, category_id, favorite, iv, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            credential.title,
            credential.username,
            credential.secret,
            credential.website,
            credential.notes,
            credential.category_id,
            credential.favorite,
            credential.iv,
            credential.user_id
        ],
    )
    .map_err(from_sqlite)?;
    Ok(conn.last_insert_rowid())
}

/// Insert a new credential row and return it with its assigned id and
/// hydrated category.
pub async fn create(db: &Database, credential: NewCredential) -> Result<Credential, PassKeeperError> {
    let created = db
        .connection()
        .call(move |conn| -> CallResult<Credential> {
            let id = match insert_in(conn, &credential) {
                Ok(id) => id,
                Err(e) => return Ok(Err(e)),
            };
            conn.query_row(
                &format!("{CREDENTIAL_SELECT} WHERE p.id = ?1"),
                params![id],
                map_credential,
            )
            .map(Ok)
        })
        .await
        .map_err(channel_err)??;
    debug!(credential_id = created.id, user_id = created.user_id, "credential created");
    Ok(created)
}

/// List a user's credentials, most recently updated first.
pub async fn find_for_user(
    db: &Database,
    user_id: i64,
) -> Result<Vec<Credential>, PassKeeperError> {
    db.connection()
        .call(move |conn| -> CallResult<Vec<Credential>> {
            Ok(query_credentials(
                conn,
                &format!(
                    "{CREDENTIAL_SELECT} WHERE p.user_id = ?1
                     ORDER BY p.updated_at DESC, p.title"
                ),
                params![user_id],
            ))
        })
        .await
        .map_err(channel_err)?
}

/// Look up a single credential, scoped to its owner.
pub async fn find_by_id(
    db: &Database,
    credential_id: i64,
    user_id: i64,
) -> Result<Option<Credential>, PassKeeperError> {
    db.connection()
        .call(move |conn| -> CallResult<Option<Credential>> {
            Ok(conn
                .query_row(
                    &format!("{CREDENTIAL_SELECT} WHERE p.id = ?1 AND p.user_id = ?2"),
                    params![credential_id, user_id],
                    map_credential,
                )
                .optional()
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)?
}

/// Case-insensitive substring search over the cleartext columns and the
/// category name. The secret is ciphertext and never searched.
pub async fn search(
    db: &Database,
    user_id: i64,
    query: &str,
) -> Result<Vec<Credential>, PassKeeperError> {
    let pattern = format!("%{query}%");
    db.connection()
        .call(move |conn| -> CallResult<Vec<Credential>> {
            Ok(query_credentials(
                conn,
                &format!(
                    "{CREDENTIAL_SELECT}
                     WHERE p.user_id = ?1
                       AND (p.title LIKE ?2 OR p.username LIKE ?2
                            OR p.website LIKE ?2 OR p.notes LIKE ?2
                            OR c.name LIKE ?2)
                     ORDER BY p.updated_at DESC, p.title"
                ),
                params![user_id, pattern],
            ))
        })
        .await
        .map_err(channel_err)?
}

/// Typed column assignments for a partial credential update.
///
/// The secret and its initialization vector can only move together.
#[derive(Debug, Default)]
pub struct CredentialUpdate {
    assignments: Vec<(&'static str, Value)>,
}

impl CredentialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.assignments.push(("title", Value::from(title.to_owned())));
        self
    }

    pub fn username(mut self, username: Option<&str>) -> Self {
        self.assignments
            .push(("username", username.map(str::to_owned).into()));
        self
    }

    /// Replace the ciphertext and the iv produced by the same encryption.
    pub fn secret(mut self, ciphertext: &str, iv: &str) -> Self {
        self.assignments
            .push(("password", Value::from(ciphertext.to_owned())));
        self.assignments.push(("iv", Value::from(iv.to_owned())));
        self
    }

    pub fn website(mut self, website: Option<&str>) -> Self {
        self.assignments
            .push(("website", website.map(str::to_owned).into()));
        self
    }

    pub fn notes(mut self, notes: Option<&str>) -> Self {
        self.assignments
            .push(("notes", notes.map(str::to_owned).into()));
        self
    }

    pub fn category_id(mut self, category_id: Option<i64>) -> Self {
        self.assignments.push(("category_id", category_id.into()));
        self
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.assignments.push(("favorite", Value::from(favorite)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Apply a partial update to a credential the user owns. An empty update
/// is a no-op; `updated_at` only moves when something else does.
pub async fn update(
    db: &Database,
    credential_id: i64,
    user_id: i64,
    changes: CredentialUpdate,
) -> Result<(), PassKeeperError> {
    if changes.is_empty() {
        warn!(credential_id, "empty credential update ignored");
        return Ok(());
    }

    let affected = db
        .connection()
        .call(move |conn| -> CallResult<usize> {
            let mut clauses = Vec::with_capacity(changes.assignments.len() + 1);
            let mut values = Vec::with_capacity(changes.assignments.len() + 2);
            for (i, (column, value)) in changes.assignments.into_iter().enumerate() {
                clauses.push(format!("{column} = ?{}", i + 1));
                values.push(value);
            }
            clauses.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')".to_owned());
            let sql = format!(
                "UPDATE passwords SET {} WHERE id = ?{} AND user_id = ?{}",
                clauses.join(", "),
                values.len() + 1,
                values.len() + 2,
            );
            values.push(Value::from(credential_id));
            values.push(Value::from(user_id));
            Ok(conn.execute(&sql, params_from_iter(values)).map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)??;
    if affected == 0 {
        return Err(PassKeeperError::Validation(format!(
            "credential {credential_id} does not exist"
        )));
    }
    debug!(credential_id, user_id, "credential updated");
    Ok(())
}

/// Delete a credential the user owns.
pub async fn delete(
    db: &Database,
    credential_id: i64,
    user_id: i64,
) -> Result<(), PassKeeperError> {
    let affected = db
        .connection()
        .call(move |conn| -> CallResult<usize> {
            Ok(conn
                .execute(
                    "DELETE FROM passwords WHERE id = ?1 AND user_id = ?2",
                    params![credential_id, user_id],
                )
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)??;
    if affected == 0 {
        return Err(PassKeeperError::Validation(format!(
            "credential {credential_id} does not exist"
        )));
    }
    debug!(credential_id, user_id, "credential deleted");
    Ok(())
}
