//! Authentication session models

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed-in session (token kept in memory only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Token response from the password grant
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    pub user: AuthUser,
}

/// User object embedded in auth responses
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl TokenResponse {
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            user_id: self.user.id,
            email: self.user.email,
            access_token: self.access_token,
            expires_at: now + chrono::Duration::seconds(self.expires_in.max(0)),
        }
    }
}
