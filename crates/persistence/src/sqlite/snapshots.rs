//! Last-seen profile snapshot storage
//!
//! One JSON record per user id. Writes are last-writer-wins; there is no
//! version check between sessions.

use crate::Database;
use async_trait::async_trait;
use gamegreeneco_core::{Error, ProfileSnapshot, Result, SnapshotStore, UserId};
use sqlx::SqlitePool;

/// Load the stored snapshot for a user.
///
/// A row whose payload does not parse yields `Error::InvalidData`.
pub async fn load_snapshot(pool: &SqlitePool, user_id: &UserId) -> Result<Option<ProfileSnapshot>> {
    let payload: Option<String> =
        sqlx::query_scalar::<sqlx::Sqlite, String>("SELECT payload FROM snapshots WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(pool)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    match payload {
        Some(json) => {
            let snapshot: ProfileSnapshot = serde_json::from_str(&json)?;
            Ok(Some(snapshot))
        }
        None => Ok(None),
    }
}

/// Store (or overwrite) the snapshot for a user
pub async fn save_snapshot(pool: &SqlitePool, user_id: &UserId, snapshot: &ProfileSnapshot) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;

    sqlx::query(
        r#"INSERT INTO snapshots (user_id, payload, updated_at)
           VALUES (?, ?, CURRENT_TIMESTAMP)
           ON CONFLICT(user_id) DO UPDATE SET
             payload = excluded.payload,
             updated_at = excluded.updated_at"#,
    )
    .bind(user_id.as_str())
    .bind(&json)
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Forget the snapshot of a user (e.g. on account removal)
pub async fn delete_snapshot(pool: &SqlitePool, user_id: &UserId) -> Result<()> {
    sqlx::query("DELETE FROM snapshots WHERE user_id = ?")
        .bind(user_id.as_str())
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// `SnapshotStore` backed by the local SQLite database
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    db: Database,
}

impl SqliteSnapshotStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load_snapshot(&self, user_id: &UserId) -> Result<Option<ProfileSnapshot>> {
        load_snapshot(self.db.pool(), user_id).await
    }

    async fn save_snapshot(&self, user_id: &UserId, snapshot: &ProfileSnapshot) -> Result<()> {
        save_snapshot(self.db.pool(), user_id, snapshot).await
    }
}
