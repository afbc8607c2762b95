use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the authorization flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed token response: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("authorization state mismatch")]
    StateMismatch,
    #[error("authorization request denied ({0})")]
    AccessDenied(String),
    #[error("authorization response missing code parameter")]
    MissingAuthorizationCode,
}
