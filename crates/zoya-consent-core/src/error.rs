//! Error types for Zoya Consent.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid cookie matcher {input:?}: {reason}")]
    InvalidCookieMatcher { input: String, reason: String },

    #[error("Duplicate app name: {0}")]
    DuplicateApp(String),

    #[error("Invalid consent configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn cookie_matcher(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCookieMatcher {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
