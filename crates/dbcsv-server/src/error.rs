//! Error types for the server.

use dbcsv_auth::AuthError;
use dbcsv_core::StorageError;
use thiserror::Error;

/// Cursor registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The id was never issued or its cursor is already closed.
    #[error("Cursor id={0} not found")]
    NotFound(String),
}

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket or filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The data directory could not be loaded.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The accounts file could not be loaded.
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
