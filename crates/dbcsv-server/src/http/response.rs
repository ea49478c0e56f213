//! HTTP response type.

use std::collections::HashMap;

use dbcsv_core::protocol::ErrorResponse;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a response with JSON content.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self {
                status: 200,
                headers: [("Content-Type".to_string(), "application/json".to_string())]
                    .into_iter()
                    .collect(),
                body,
            },
            Err(_) => Self::internal_server_error(),
        }
    }

    /// Creates an error response with a `{"detail": ...}` JSON body.
    pub fn detail(status: u16, detail: impl Into<String>) -> Self {
        Self::json(&ErrorResponse {
            detail: detail.into(),
        })
        .status(status)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::detail(400, detail)
    }

    /// Creates a 401 Unauthorized response asking for a bearer token.
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::detail(401, detail).header("WWW-Authenticate", "Bearer")
    }

    /// Creates a 403 Forbidden response.
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::detail(403, detail)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::detail(404, "Not Found")
    }

    /// Creates a 405 Method Not Allowed response.
    pub fn method_not_allowed() -> Self {
        Self::detail(405, "Method Not Allowed")
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_server_error() -> Self {
        Self {
            status: 500,
            headers: HashMap::new(),
            body: b"Internal Server Error".to_vec(),
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
