//! Profile edits and earned badges

use gamegreeneco_core::{EcoStore, Error, Profile, ProfileUpdate, Result, UserBadge, UserId};
use std::sync::Arc;
use tracing::info;

pub struct ProfileService {
    store: Arc<dyn EcoStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn EcoStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<Profile> {
        self.store
            .fetch_profile(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("profile for user {}", user_id)))
    }

    /// Apply a partial edit of the user's own profile
    pub async fn update(&self, user_id: &UserId, update: &ProfileUpdate) -> Result<Profile> {
        if update.is_empty() {
            return Err(Error::InvalidData("Profile update has no fields".to_string()));
        }
        let profile = self.store.update_profile(user_id, update).await?;
        info!("Profile updated for {}", user_id);
        Ok(profile)
    }

    /// Badges earned by the user, newest first
    pub async fn badges(&self, user_id: &UserId) -> Result<Vec<UserBadge>> {
        self.store.user_badges(user_id).await
    }
}
