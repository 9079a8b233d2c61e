//! Error types and Result alias for GameGreenEco

use thiserror::Error;

/// Main error type shared by every GameGreenEco crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Session token expired")]
    TokenExpired,

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Video proof is required before submission {0} can be approved")]
    ProofRequired(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Quiz is locked until lesson {0} is completed")]
    QuizLocked(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
