//! Error types for authentication.

use std::path::PathBuf;

use thiserror::Error;

/// Authentication-specific errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The accounts file could not be read.
    #[error("cannot read accounts file {path}: {source}")]
    AccountsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The accounts file is not valid JSON.
    #[error("invalid accounts file {path}: {source}")]
    AccountsFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Invalid credentials.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// User is disabled.
    #[error("user account is disabled")]
    UserInactive,

    /// Token unknown, malformed or revoked.
    #[error("Could not validate credentials")]
    SessionNotFound,

    /// Token past its expiry.
    #[error("token has expired")]
    SessionExpired,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHashError,

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
