// SPDX-FileCopyrightText: 2026 PassKeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category rows.
//!
//! Visibility is the union of the caller's own rows and the system
//! defaults (`user_id = 0`). System rows are immutable: update and delete
//! refuse to touch them by scoping their WHERE clause to the owner.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use passkeeper_core::PassKeeperError;

use crate::database::{channel_err, from_sqlite, CallResult, Database};
use crate::models::{Category, NewCategory, SYSTEM_USER_ID};

fn map_category(row: &Row<'_>) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get("id")?,
        key: row.get("key")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

const CATEGORY_COLUMNS: &str = "id, key, name, icon, color, user_id, created_at, updated_at";

/// Connection-level insert, usable inside an open transaction.
pub fn insert_in(conn: &Connection, category: &NewCategory) -> Result<i64, PassKeeperError> {
    conn.execute(
        "INSERT INTO categories (key, name, icon, color, user_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            category.key,
            category.name,
            category.icon,
            category.color,
            category.user_id
        ],
    )
    .map_err(from_sqlite)?;
    Ok(conn.last_insert_rowid())
}

/// Connection-level listing of everything visible to `user_id`, usable
/// inside an open transaction.
pub fn find_for_user_in(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<Category>, PassKeeperError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE user_id = ?1 OR user_id = ?2
             ORDER BY id"
        ))
        .map_err(from_sqlite)?;
    let rows = stmt
        .query_map(params![user_id, SYSTEM_USER_ID], map_category)
        .map_err(from_sqlite)?;
    let mut categories = Vec::new();
    for row in rows {
        categories.push(row.map_err(from_sqlite)?);
    }
    Ok(categories)
}

/// Insert a new category row and return it with its assigned id.
pub async fn create(db: &Database, category: NewCategory) -> Result<Category, PassKeeperError> {
    let created = db
        .connection()
        .call(move |conn| -> CallResult<Category> {
            let id = match insert_in(conn, &category) {
                Ok(id) => id,
                Err(e) => return Ok(Err(e)),
            };
            conn.query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
                params![id],
                map_category,
            )
            .map(Ok)
        })
        .await
        .map_err(channel_err)??;
    debug!(category_id = created.id, user_id = created.user_id, "category created");
    Ok(created)
}

/// List every category visible to `user_id`: their own plus the system
/// defaults, in insertion order.
pub async fn find_for_user(db: &Database, user_id: i64) -> Result<Vec<Category>, PassKeeperError> {
    db.connection()
        .call(move |conn| -> CallResult<Vec<Category>> { Ok(find_for_user_in(conn, user_id)) })
        .await
        .map_err(channel_err)?
}

/// Look up a single category by id, scoped to what `user_id` may see.
pub async fn find_by_id(
    db: &Database,
    category_id: i64,
    user_id: i64,
) -> Result<Option<Category>, PassKeeperError> {
    db.connection()
        .call(move |conn| -> CallResult<Option<Category>> {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {CATEGORY_COLUMNS} FROM categories
                         WHERE id = ?1 AND (user_id = ?2 OR user_id = ?3)"
                    ),
                    params![category_id, user_id, SYSTEM_USER_ID],
                    map_category,
                )
                .optional()
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)?
}

/// Rename or restyle a category the user owns. System defaults are out of
/// reach and report as missing.
pub async fn update(
    db: &Database,
    category_id: i64,
    user_id: i64,
    name: String,
    icon: Option<String>,
    color: Option<String>,
) -> Result<(), PassKeeperError> {
    let affected = db
        .connection()
        .call(move |conn| -> CallResult<usize> {
            Ok(conn
                .execute(
                    "UPDATE categories
                     SET name = ?1, icon = ?2, color = ?3,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?4 AND user_id = ?5",
                    params![name, icon, color, category_id, user_id],
                )
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)??;
    if affected == 0 {
        return Err(PassKeeperError::Validation(format!(
            "category {category_id} does not exist or is not editable"
        )));
    }
    debug!(category_id, user_id, "category updated");
    Ok(())
}

/// Delete a category the user owns. Credentials filed under it fall back
/// to uncategorized via the schema's ON DELETE SET NULL.
pub async fn delete(db: &Database, category_id: i64, user_id: i64) -> Result<(), PassKeeperError> {
    let affected = db
        .connection()
        .call(move |conn| -> CallResult<usize> {
            Ok(conn
                .execute(
                    "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
                    params![category_id, user_id],
                )
                .map_err(from_sqlite))
        })
        .await
        .map_err(channel_err)??;
    if affected == 0 {
        return Err(PassKeeperError::Validation(format!(
            "category {category_id} does not exist or is not editable"
        )));
    }
    debug!(category_id, user_id, "category deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;
    use tempfile::tempdir;

    async fn open_db(dir: &tempfile::TempDir) -> Database {
        Database::open(dir.path().join("categories.db").to_str().unwrap())
            .await
            .unwrap()
    }

    fn new_category(name: &str, user_id: i64) -> NewCategory {
        NewCategory {
            key: None,
            name: name.into(),
            icon: Some("folder".into()),
            color: Some("#336699".into()),
            user_id,
        }
    }

    #[tokio::test]
    async fn visibility_is_own_plus_system() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let alice = users::create(&db, "alice", "digest").await.unwrap();
        let bob = users::create(&db, "bob", "digest").await.unwrap();

        let system = create(
            &db,
            NewCategory {
                key: Some("work".into()),
                name: "Work".into(),
                icon: None,
                color: None,
                user_id: SYSTEM_USER_ID,
            },
        )
        .await
        .unwrap();
        assert!(system.is_system());

        let own = create(&db, new_category("Banking", alice.id)).await.unwrap();
        create(&db, new_category("Gaming", bob.id)).await.unwrap();

        let visible = find_for_user(&db, alice.id).await.unwrap();
        let names: Vec<&str> = visible.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Work", "Banking"]);
        assert!(visible.iter().any(|c| c.id == own.id));
    }

    #[tokio::test]
    async fn find_by_id_respects_ownership() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let alice = users::create(&db, "alice", "digest").await.unwrap();
        let bob = users::create(&db, "bob", "digest").await.unwrap();

        let own = create(&db, new_category("Banking", alice.id)).await.unwrap();
        assert!(find_by_id(&db, own.id, alice.id).await.unwrap().is_some());
        assert!(find_by_id(&db, own.id, bob.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_refuses_system_rows() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let alice = users::create(&db, "alice", "digest").await.unwrap();

        let system = create(
            &db,
            NewCategory {
                key: Some("work".into()),
                name: "Work".into(),
                icon: None,
                color: None,
                user_id: SYSTEM_USER_ID,
            },
        )
        .await
        .unwrap();

        let err = update(&db, system.id, alice.id, "Hacked".into(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PassKeeperError::Validation(_)));

        let untouched = find_by_id(&db, system.id, alice.id).await.unwrap().unwrap();
        assert_eq!(untouched.name, "Work");
    }

    #[tokio::test]
    async fn update_and_delete_own_rows() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let alice = users::create(&db, "alice", "digest").await.unwrap();

        let own = create(&db, new_category("Banking", alice.id)).await.unwrap();
        update(
            &db,
            own.id,
            alice.id,
            "Finance".into(),
            Some("bank".into()),
            None,
        )
        .await
        .unwrap();

        let reloaded = find_by_id(&db, own.id, alice.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Finance");
        assert_eq!(reloaded.icon.as_deref(), Some("bank"));
        assert_eq!(reloaded.color, None);

        delete(&db, own.id, alice.id).await.unwrap();
        assert!(find_by_id(&db, own.id, alice.id).await.unwrap().is_none());
    }
}
