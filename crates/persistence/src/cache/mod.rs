//! In-memory caching layer for profile aggregates

use gamegreeneco_core::{Profile, UserId};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cached item with expiration
struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Thread-safe read-through cache of profiles with TTL and max-entry bounds
pub struct ProfileCache {
    profiles: RwLock<HashMap<UserId, CacheEntry<Profile>>>,
    default_ttl: Duration,
    max_entries: usize,
}

impl ProfileCache {
    pub fn with_capacity(default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            default_ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Get a profile from cache if not expired
    pub fn get(&self, user_id: &UserId) -> Option<Profile> {
        let cache = self.profiles.read().ok()?;
        let entry = cache.get(user_id)?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.value.clone())
        }
    }

    /// Insert or update a profile.
    /// Evicts expired entries, then the oldest one, when at capacity.
    pub fn insert(&self, profile: Profile) {
        if let Ok(mut cache) = self.profiles.write() {
            if cache.len() >= self.max_entries && !cache.contains_key(&profile.user_id) {
                cache.retain(|_, entry| !entry.is_expired());
            }

            if cache.len() >= self.max_entries && !cache.contains_key(&profile.user_id) {
                if let Some(oldest_key) = cache
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    cache.remove(&oldest_key);
                }
            }

            cache.insert(
                profile.user_id.clone(),
                CacheEntry {
                    value: profile,
                    inserted_at: Instant::now(),
                    ttl: self.default_ttl,
                },
            );
        }
    }

    /// Drop a profile, e.g. after a write that changes its aggregates
    pub fn invalidate(&self, user_id: &UserId) {
        if let Ok(mut cache) = self.profiles.write() {
            cache.remove(user_id);
        }
    }

    /// Clear all expired entries
    pub fn cleanup(&self) {
        if let Ok(mut cache) = self.profiles.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.profiles.write() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        // Profiles change on every lesson/mission; keep them short-lived
        Self::with_capacity(Duration::from_secs(15), 64)
    }
}
