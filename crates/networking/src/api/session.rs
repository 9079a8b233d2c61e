//! Operations on behalf of the signed-in user

use crate::BackendClient;
use gamegreeneco_core::{EcoStore, Error, Profile, Result};
use tracing::debug;

/// Fetch the profile of the signed-in user
pub async fn fetch_current_profile(client: &BackendClient) -> Result<Profile> {
    let user_id = client.current_user_id()?;
    debug!("Loading profile for {}", user_id);
    client
        .fetch_profile(&user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("profile for user {}", user_id)))
}
