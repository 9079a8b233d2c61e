//! Badge models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Badge definition from the `badges` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Badge earned by a user, newest first when listed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBadge {
    pub id: String,
    pub earned_at: DateTime<Utc>,
    pub badge: Badge,
}
