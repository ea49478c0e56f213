//! JSON payloads exchanged between the server and the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Value;

/// The `status` field of every successful response.
pub const STATUS_SUCCESS: &str = "success";

/// The only token type issued.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// Length of the hex-encoded random part of a bearer token.
pub const TOKEN_KEY_LEN: usize = 64;

/// A result row.
pub type Row = Vec<Value>;

/// Body of `POST /query/execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub sql_statement: String,
    pub schema: String,
}

/// A projected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    /// The declared type name from the table metadata.
    pub type_code: String,
}

/// Response of `POST /query/execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub status: String,
    pub cursor_id: String,
    pub position: u64,
    #[serde(default)]
    pub description: Vec<ColumnDescription>,
}

/// Response of `GET /query/fetchone/{id}`; `data` is `null` at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOneResponse {
    pub status: String,
    pub data: Option<Row>,
    pub position: u64,
}

/// Response of `GET /query/fetchmany/{id}` and `GET /query/fetchall/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchManyResponse {
    pub status: String,
    pub data: Vec<Row>,
    pub position: u64,
}

/// A bare acknowledgment, optionally with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    /// A `success` acknowledgment.
    #[must_use]
    pub fn success(message: Option<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message,
        }
    }
}

/// Response of `POST /auth/connect` and `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Expiry as unix seconds.
    pub expiry: i64,
}

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// The publicly readable part of a bearer token.
///
/// Tokens have the form `<64 hex chars>.<expiry unix seconds>`. Only the
/// server can tell whether a token is valid; clients read the expiry to
/// decide when to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub expires_at: DateTime<Utc>,
}

impl TokenClaims {
    /// Formats a token from its random key and expiry.
    #[must_use]
    pub fn encode(key: &str, expires_at: DateTime<Utc>) -> String {
        format!("{key}.{}", expires_at.timestamp())
    }

    /// Reads the expiry of a token without verifying it.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let (key, expiry) = token.split_once('.')?;
        if key.len() != TOKEN_KEY_LEN || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let seconds: i64 = expiry.parse().ok()?;
        DateTime::from_timestamp(seconds, 0).map(|expires_at| Self { expires_at })
    }

    /// Returns the remaining validity at `now`, negative once expired.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.expires_at - now
    }
}
