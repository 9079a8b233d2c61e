//! Application configuration from the environment

use gamegreeneco_core::{Error, Result};
use std::path::PathBuf;

pub const BACKEND_URL_VAR: &str = "GGE_BACKEND_URL";
pub const API_KEY_VAR: &str = "GGE_API_KEY";
pub const EMAIL_VAR: &str = "GGE_EMAIL";
pub const PASSWORD_VAR: &str = "GGE_PASSWORD";
pub const DATA_DIR_VAR: &str = "GGE_DATA_DIR";

const DATABASE_FILE: &str = "gamegreeneco.db";

#[derive(Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub api_key: String,
    pub email: String,
    pub password: String,
    pub data_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend_url", &self.backend_url)
            .field("email", &self.email)
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

/// `<local data dir>/GameGreenEco`, or the working directory
pub fn default_data_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|p| p.join("GameGreenEco"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| Error::InvalidData(format!("{} is not set", key)));

        Ok(Self {
            backend_url: required(BACKEND_URL_VAR)?,
            api_key: required(API_KEY_VAR)?,
            email: required(EMAIL_VAR)?,
            password: required(PASSWORD_VAR)?,
            data_dir: get(DATA_DIR_VAR).map(PathBuf::from).unwrap_or_else(default_data_dir),
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
