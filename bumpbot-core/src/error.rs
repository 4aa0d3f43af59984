// ================================================================
// File: bumpbot-core/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Permission error: {0}")]
    Permission(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
