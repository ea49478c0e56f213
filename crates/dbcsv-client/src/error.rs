//! Client error kinds.

use thiserror::Error;

/// Errors raised by connections and cursors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Misuse of the API: a malformed DSN, an invalid fetch size, or a
    /// cursor that is not open.
    #[error("Interface error: {0}")]
    Interface(String),

    /// Operation on a closed connection, or a second close.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The statement was rejected: syntax errors, unknown schemas, tables
    /// or columns.
    #[error("Programming error: {0}")]
    Programming(String),

    /// The server no longer knows the cursor.
    #[error("Operational error: {0}")]
    Operational(String),

    /// Bad credentials, an expired token or a rejected refresh.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The server could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// Transactions are not supported.
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_builder() {
            Self::Internal(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
