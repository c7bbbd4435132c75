// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account rows.
//!
//! The `password` column stores the login digest (hex SHA-256 over
//! password and salt), never an encryption key and never plaintext.

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use passkeeper_core::PassKeeperError;

use crate::database::{channel_err, from_sqlite, CallResult, Database};
use crate::models::User;

fn map_user(row: &Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        auth_hash: row.get("password")?,
        biometric: row.get("biometric")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

const USER_COLUMNS: &str = "id, username, password, biometric, created_at, updated_at";

/// Insert a new user row and return it with its assigned id.
pub async fn create(
    db: &Database,
    username: &str,
    auth_hash: &str,
) -> Result<User, PassKeeperError> {
    let username = username.to_owned();
    let auth_hash = auth_hash.to_owned();
    let user = db
        .connection()
        .call(move |conn| -> CallResult<User> {
            if let Err(e) = conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                params![username, auth_hash],
            ) {
                return Ok(Err(from_sqlite(e)));
            }
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user,
            )
            .map(Ok)
        })
        .await
        .map_err(channel_err)??;
    debug!(user_id = user.id, "user created");
    Ok(user)
}

/// Look up a user by username. Usernames are matched exactly.
pub async fn find_by_username(
    db: &Database,
    username: &str,
) -> Result<Option<User>, PassKeeperError> {
    let username = username.to_owned();
    db.connection()
        .call(move |conn| -> CallResult<Option<User>> {
            Ok(conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 AND id > 0"),
                    params![username],
                    map_user,
                )
                .optional()
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)?
}

/// Look up a user by id.
pub async fn find_by_id(db: &Database, user_id: i64) -> Result<Option<User>, PassKeeperError> {
    db.connection()
        .call(move |conn| -> CallResult<Option<User>> {
            Ok(conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND id > 0"),
                    params![user_id],
                    map_user,
                )
                .optional()
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)?
}

/// Replace the stored login digest after a password change.
pub async fn update_auth_hash(
    db: &Database,
    user_id: i64,
    auth_hash: &str,
) -> Result<(), PassKeeperError> {
    let auth_hash = auth_hash.to_owned();
    let affected = db
        .connection()
        .call(move |conn| -> CallResult<usize> {
            Ok(conn
                .execute(
                    "UPDATE users
                     SET password = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2 AND id > 0",
                    params![auth_hash, user_id],
                )
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)??;
    if affected == 0 {
        return Err(PassKeeperError::Validation(format!(
            "user {user_id} does not exist"
        )));
    }
    debug!(user_id, "auth hash updated");
    Ok(())
}

/// Delete a user. Owned categories and credentials cascade.
pub async fn delete(db: &Database, user_id: i64) -> Result<(), PassKeeperError> {
    let affected = db
        .connection()
        .call(move |conn| -> CallResult<usize> {
            Ok(conn
                .execute("DELETE FROM users WHERE id = ?1 AND id > 0", params![user_id])
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)??;
    if affected == 0 {
        return Err(PassKeeperError::Validation(format!(
            "user {user_id} does not exist"
        )));
    }
    debug!(user_id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_db(dir: &tempfile::TempDir) -> Database {
        Database::open(dir.path().join("users.db").to_str().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_find_roundtrip() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        let created = create(&db, "alice", "digest-a").await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.username, "alice");
        assert_eq!(created.auth_hash, "digest-a");
        assert!(!created.biometric);

        let by_name = find_by_username(&db, "alice").await.unwrap().unwrap();
        assert_eq!(by_name, created);

        let by_id = find_by_id(&db, created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);
    }

    #[tokio::test]
    async fn missing_user_is_none_not_error() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        assert!(find_by_username(&db, "nobody").await.unwrap().is_none());
        assert!(find_by_id(&db, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn system_sentinel_is_invisible_to_lookups() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        assert!(find_by_id(&db, 0).await.unwrap().is_none());
        assert!(find_by_username(&db, "system").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_auth_hash_replaces_digest() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        let user = create(&db, "bob", "old-digest").await.unwrap();
        update_auth_hash(&db, user.id, "new-digest").await.unwrap();

        let reloaded = find_by_id(&db, user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.auth_hash, "new-digest");
    }

    #[tokio::test]
    async fn delete_removes_user_and_rejects_unknown_id() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;

        let user = create(&db, "carol", "digest").await.unwrap();
        delete(&db, user.id).await.unwrap();
        assert!(find_by_id(&db, user.id).await.unwrap().is_none());

        let err = delete(&db, user.id).await.unwrap_err();
        assert!(matches!(err, PassKeeperError::Validation(_)));
    }
}
