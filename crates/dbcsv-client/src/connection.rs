//! Connections: an authenticated session against one schema.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::cursor::Cursor;
use crate::dsn::Dsn;
use crate::error::{Error, Result};
use crate::token::{check_token, refresh_threshold_from_env, TokenCheck};

/// Tuning knobs for [`connect_with`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Refresh the token once its remaining validity drops to this.
    pub refresh_threshold: Duration,
    /// Default `fetchmany` size of new cursors.
    pub arraysize: i64,
    /// Per-request HTTP timeout.
    pub timeout: StdDuration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            refresh_threshold: refresh_threshold_from_env(),
            arraysize: 1,
            timeout: StdDuration::from_secs(30),
        }
    }
}

/// State shared between a connection and its cursors.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) api: ApiClient,
    pub(crate) schema: String,
    pub(crate) options: ConnectOptions,
    token: Mutex<String>,
    online: AtomicBool,
}

impl Shared {
    pub(crate) fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_online(&self, operation: &str) -> Result<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "Cannot perform {operation}() on cursor of a closed connection"
            )))
        }
    }

    pub(crate) fn token(&self) -> String {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: String) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Returns a usable token, refreshing it when it is about to expire.
    pub(crate) async fn fresh_token(&self) -> Result<String> {
        let token = self.token();
        match check_token(&token, self.options.refresh_threshold, Utc::now())? {
            TokenCheck::Keep => Ok(token),
            TokenCheck::Expired => Err(Error::Authentication(
                "Token has expired and cannot be used to execute any query. \
                 Open a new connection to get a new one"
                    .to_string(),
            )),
            TokenCheck::Refresh => {
                debug!("Access token about to expire, refreshing");
                let refreshed = self.api.refresh(&token).await?;
                self.set_token(refreshed.access_token.clone());
                Ok(refreshed.access_token)
            }
        }
    }
}

/// An open connection to one schema on a server.
#[derive(Debug)]
pub struct Connection {
    shared: Arc<Shared>,
}

/// Connects with default options.
///
/// # Errors
///
/// See [`connect_with`].
pub async fn connect(dsn: &str, user: &str, password: &str) -> Result<Connection> {
    connect_with(dsn, user, password, ConnectOptions::default()).await
}

/// Validates the DSN, checks the schema exists and logs in.
///
/// # Errors
///
/// - `Error::Interface` for a malformed DSN, before any request is sent
/// - `Error::Programming` if the schema does not exist
/// - `Error::Authentication` for bad credentials
/// - `Error::Network` if the server cannot be reached
pub async fn connect_with(
    dsn: &str,
    user: &str,
    password: &str,
    options: ConnectOptions,
) -> Result<Connection> {
    let dsn = Dsn::parse(dsn)?;
    let api = ApiClient::new(dsn.base_url.clone(), options.timeout)?;

    api.ping(&dsn.schema).await?;
    let token = api.connect(user, password).await?;
    info!(url = %dsn.base_url, schema = %dsn.schema, %user, "Connected");

    Ok(Connection::new(api, dsn.schema, token.access_token, options))
}

impl Connection {
    pub(crate) fn new(api: ApiClient, schema: String, token: String, options: ConnectOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                schema,
                options,
                token: Mutex::new(token),
                online: AtomicBool::new(true),
            }),
        }
    }

    /// Returns the server address.
    #[must_use]
    pub fn url(&self) -> &str {
        self.shared.api.base_url()
    }

    /// Returns the schema queries run against.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.shared.schema
    }

    /// Returns false once the connection is closed.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.shared.is_online()
    }

    /// Returns the current access token.
    #[must_use]
    pub fn access_token(&self) -> String {
        self.shared.token()
    }

    /// Creates a cursor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the connection is closed.
    pub fn cursor(&self) -> Result<Cursor> {
        if !self.is_online() {
            return Err(Error::Internal(
                "Cannot create any cursor from a closed connection".to_string(),
            ));
        }
        Ok(Cursor::new(self.shared.clone()))
    }

    /// Transactions are not supported.
    ///
    /// # Errors
    ///
    /// Always returns `Error::NotSupported`.
    pub fn commit(&self) -> Result<()> {
        Err(Error::NotSupported(
            "commit() is currently not supported".to_string(),
        ))
    }

    /// Transactions are not supported.
    ///
    /// # Errors
    ///
    /// Always returns `Error::NotSupported`.
    pub fn rollback(&self) -> Result<()> {
        Err(Error::NotSupported(
            "rollback() is currently not supported".to_string(),
        ))
    }

    /// Closes the connection. Its cursors stop working.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the connection is already closed.
    pub fn close(&self) -> Result<()> {
        self.shared
            .online
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| debug!(url = %self.url(), "Connection closed"))
            .map_err(|_| Error::Internal("Connection is already closed".to_string()))
    }
}
