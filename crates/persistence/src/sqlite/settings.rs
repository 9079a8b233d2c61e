//! Key/value settings stored as JSON

use gamegreeneco_core::{Error, Result, RewardTimings};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

const REWARD_TIMINGS_KEY: &str = "reward_timings";

/// Read a JSON setting; `None` when the key is absent
pub async fn load_setting<T: DeserializeOwned>(pool: &SqlitePool, key: &str) -> Result<Option<T>> {
    let json = sqlx::query_scalar::<sqlx::Sqlite, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    match json {
        Some(j) => Ok(Some(serde_json::from_str(&j)?)),
        None => Ok(None),
    }
}

/// Write a JSON setting, replacing any previous value
pub async fn save_setting<T: Serialize>(pool: &SqlitePool, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;

    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
    )
    .bind(key)
    .bind(&json)
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Load reward timings, falling back to defaults when missing or unreadable
pub async fn load_reward_timings(pool: &SqlitePool) -> RewardTimings {
    match load_setting::<RewardTimings>(pool, REWARD_TIMINGS_KEY).await {
        Ok(Some(timings)) => timings,
        Ok(None) => RewardTimings::default(),
        Err(e) => {
            warn!("Ignoring stored reward timings: {}", e);
            RewardTimings::default()
        }
    }
}

/// Persist reward timings
pub async fn save_reward_timings(pool: &SqlitePool, timings: &RewardTimings) -> Result<()> {
    save_setting(pool, REWARD_TIMINGS_KEY, timings).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_reward_timings_default_when_absent() {
        let db = Database::connect_in_memory().await.unwrap();
        assert_eq!(load_reward_timings(db.pool()).await, RewardTimings::default());
    }

    #[tokio::test]
    async fn test_reward_timings_roundtrip_and_replace() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut timings = RewardTimings::default();
        timings.claim_grace_ms = 1_000;
        save_reward_timings(db.pool(), &timings).await.unwrap();

        timings.level_step_ms = 150;
        save_reward_timings(db.pool(), &timings).await.unwrap();

        let loaded = load_reward_timings(db.pool()).await;
        assert_eq!(loaded.claim_grace_ms, 1_000);
        assert_eq!(loaded.level_step_ms, 150);
    }

    #[tokio::test]
    async fn test_malformed_timings_fall_back_to_default() {
        let db = Database::connect_in_memory().await.unwrap();
        sqlx::query("INSERT INTO settings (key, value) VALUES ('reward_timings', '[1,2]')")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(load_reward_timings(db.pool()).await, RewardTimings::default());
    }
}
