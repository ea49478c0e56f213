//! Typed calls to the server's HTTP endpoints.

use std::time::Duration;

use dbcsv_core::protocol::{
    ErrorResponse, ExecuteRequest, ExecuteResponse, FetchManyResponse, FetchOneResponse,
    StatusResponse, TokenResponse,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// Reads the `detail` of an error body, or the status line if there is none.
async fn detail(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.detail,
        Err(_) => status.to_string(),
    }
}

/// Decodes a success body, mapping error statuses through `on_error`.
async fn decode<T: DeserializeOwned>(
    response: Response,
    on_error: impl FnOnce(StatusCode, String) -> Error,
) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let detail = detail(response).await;
        debug!(%status, %detail, "Request failed");
        Err(on_error(status, detail))
    }
}

fn unexpected(status: StatusCode, detail: String) -> Error {
    Error::Internal(format!("Unexpected response {status}: {detail}"))
}

/// Cursor endpoints report unknown ids with 404.
fn cursor_error(status: StatusCode, detail: String) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::Operational(detail),
        StatusCode::BAD_REQUEST => Error::Interface(detail),
        _ => unexpected(status, detail),
    }
}

/// HTTP client bound to one server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `base_url` (`scheme://host[:port]`).
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Returns the server address.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /query/ping`: checks that `schema` exists.
    pub async fn ping(&self, schema: &str) -> Result<StatusResponse> {
        let response = self
            .http
            .get(self.url("/query/ping"))
            .query(&[("schema", schema)])
            .send()
            .await?;
        decode(response, |status, detail| match status {
            StatusCode::NOT_FOUND => Error::Programming(detail),
            _ => unexpected(status, detail),
        })
        .await
    }

    /// `POST /auth/connect`: exchanges credentials for a token.
    pub async fn connect(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(self.url("/auth/connect"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        decode(response, |status, detail| match status {
            StatusCode::UNAUTHORIZED => {
                Error::Authentication("Invalid username or password".to_string())
            }
            _ => unexpected(status, detail),
        })
        .await
    }

    /// `POST /auth/refresh`: exchanges a valid token for a new one.
    pub async fn refresh(&self, token: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .bearer_auth(token)
            .send()
            .await?;
        decode(response, |status, detail| match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Authentication(format!("Token verification failed: {detail}"))
            }
            _ => unexpected(status, detail),
        })
        .await
    }

    /// `POST /query/execute`: opens a server-side cursor.
    pub async fn execute(&self, token: &str, schema: &str, sql: &str) -> Result<ExecuteResponse> {
        let body = ExecuteRequest {
            sql_statement: sql.to_string(),
            schema: schema.to_string(),
        };
        let response = self
            .http
            .post(self.url("/query/execute"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        decode(response, |status, detail| match status {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Error::Programming(detail),
            StatusCode::UNAUTHORIZED => Error::Authentication(detail),
            _ => unexpected(status, detail),
        })
        .await
    }

    /// `GET /query/fetchone/{id}`
    pub async fn fetch_one(&self, cursor_id: &str) -> Result<FetchOneResponse> {
        let response = self
            .http
            .get(self.url(&format!("/query/fetchone/{cursor_id}")))
            .send()
            .await?;
        decode(response, cursor_error).await
    }

    /// `GET /query/fetchmany/{id}?size=N`
    pub async fn fetch_many(&self, cursor_id: &str, size: i64) -> Result<FetchManyResponse> {
        let response = self
            .http
            .get(self.url(&format!("/query/fetchmany/{cursor_id}")))
            .query(&[("size", size)])
            .send()
            .await?;
        decode(response, cursor_error).await
    }

    /// `GET /query/fetchall/{id}`
    pub async fn fetch_all(&self, cursor_id: &str) -> Result<FetchManyResponse> {
        let response = self
            .http
            .get(self.url(&format!("/query/fetchall/{cursor_id}")))
            .send()
            .await?;
        decode(response, cursor_error).await
    }

    /// `DELETE /query/close/{id}`
    pub async fn close(&self, cursor_id: &str) -> Result<StatusResponse> {
        let response = self
            .http
            .delete(self.url(&format!("/query/close/{cursor_id}")))
            .send()
            .await?;
        decode(response, cursor_error).await
    }
}
