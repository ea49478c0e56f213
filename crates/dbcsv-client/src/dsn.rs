//! Parsing of `scheme://host[:port]/schema` connection strings.

use reqwest::Url;

use crate::error::{Error, Result};

/// A validated DSN split into server address and schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    /// `scheme://host[:port]` without a trailing slash.
    pub base_url: String,
    pub schema: String,
}

impl Dsn {
    /// Validates `dsn`.
    ///
    /// The scheme must be `http` or `https`, the path must be exactly one
    /// non-empty segment, and query, fragment and credentials are rejected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Interface` describing the first violation.
    pub fn parse(dsn: &str) -> Result<Self> {
        let url = Url::parse(dsn).map_err(|err| {
            if err.to_string().contains("port") {
                Error::Interface("Port number is not valid (not in range 1-65535)".to_string())
            } else {
                Error::Interface(format!("Malformed DSN '{dsn}': {err}"))
            }
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Interface("DSN must be http or https".to_string()));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::Interface("DSN must name a host".to_string()));
        }

        if url.port() == Some(0) {
            return Err(Error::Interface(
                "Port number is not valid (not in range 1-65535)".to_string(),
            ));
        }

        if url.query().is_some()
            || url.fragment().is_some()
            || !url.username().is_empty()
            || url.password().is_some()
        {
            return Err(Error::Interface(
                "DSN must not contain query, fragment, user/password".to_string(),
            ));
        }

        let segments: Vec<&str> = url.path().trim_matches('/').split('/').collect();
        let [schema] = segments.as_slice() else {
            return Err(Error::Interface(
                "DSN must end with exactly one path component (the schema)".to_string(),
            ));
        };
        if schema.is_empty() {
            return Err(Error::Interface(
                "DSN must end with exactly one path component (the schema)".to_string(),
            ));
        }

        Ok(Self {
            base_url: url.origin().ascii_serialization(),
            schema: (*schema).to_string(),
        })
    }
}
