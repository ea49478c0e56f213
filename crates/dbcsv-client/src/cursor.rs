//! Cursors: paging through the rows of one statement at a time.

use std::sync::Arc;

use dbcsv_core::protocol::{ColumnDescription, Row};
use dbcsv_core::Value;
use tracing::debug;

use crate::connection::Shared;
use crate::error::{Error, Result};

const NOT_OPEN: &str = "Cursor is not open or has been closed. Call execute() first";

/// A client-side handle on a server cursor.
///
/// `execute` opens a server cursor; the fetch methods page through it and
/// `close` releases it. Executing again closes the previous cursor first.
#[derive(Debug)]
pub struct Cursor {
    conn: Arc<Shared>,
    cursor_id: Option<String>,
    description: Option<Vec<ColumnDescription>>,
    rowcount: i64,
    /// Number of rows `fetchmany` returns when no size is given.
    pub arraysize: i64,
}

impl Cursor {
    pub(crate) fn new(conn: Arc<Shared>) -> Self {
        let arraysize = conn.options.arraysize;
        Self {
            conn,
            cursor_id: None,
            description: None,
            rowcount: -1,
            arraysize,
        }
    }

    /// Returns the server cursor id while open.
    #[must_use]
    pub fn cursor_id(&self) -> Option<&str> {
        self.cursor_id.as_deref()
    }

    /// Returns the projected columns of the last statement.
    #[must_use]
    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.description.as_deref()
    }

    /// Returns how many rows were delivered so far, or -1 before `execute`.
    #[must_use]
    pub const fn rowcount(&self) -> i64 {
        self.rowcount
    }

    /// Always `None`: statements never insert.
    #[must_use]
    pub const fn lastrowid(&self) -> Option<i64> {
        None
    }

    /// No-op.
    pub fn setinputsizes(&mut self, _sizes: &[i64]) {}

    /// No-op.
    pub fn setoutputsize(&mut self, _size: i64, _column: Option<usize>) {}

    fn open_id(&self, operation: &str) -> Result<String> {
        self.conn.ensure_online(operation)?;
        self.cursor_id
            .clone()
            .ok_or_else(|| Error::Interface(NOT_OPEN.to_string()))
    }

    /// Runs `sql` and opens a server cursor over its result.
    ///
    /// Parameter binding is not supported: a non-empty `params` is rejected.
    ///
    /// # Errors
    ///
    /// - `Error::Internal` if the connection is closed
    /// - `Error::NotSupported` for non-empty `params`
    /// - `Error::Authentication` if the token expired or its refresh failed
    /// - `Error::Programming` if the server rejects the statement
    pub async fn execute(&mut self, sql: &str, params: Option<&[Value]>) -> Result<()> {
        self.conn.ensure_online("execute")?;
        if params.is_some_and(|p| !p.is_empty()) {
            return Err(Error::NotSupported(
                "Parameter binding is not supported".to_string(),
            ));
        }

        if self.cursor_id.is_some() {
            self.close().await?;
        }

        let token = self.conn.fresh_token().await?;
        let opened = self
            .conn
            .api
            .execute(&token, &self.conn.schema, sql)
            .await?;
        debug!(cursor_id = %opened.cursor_id, "Cursor opened");

        self.cursor_id = Some(opened.cursor_id);
        self.description = Some(opened.description);
        self.rowcount = position(opened.position);
        Ok(())
    }

    /// Fetches the next row, or `None` at the end.
    ///
    /// # Errors
    ///
    /// Returns `Error::Interface` if no cursor is open and
    /// `Error::Operational` if the server no longer knows it.
    pub async fn fetchone(&mut self) -> Result<Option<Row>> {
        let id = self.open_id("fetchone")?;
        let page = self.conn.api.fetch_one(&id).await?;
        self.rowcount = position(page.position);
        Ok(page.data)
    }

    /// Fetches up to `size` rows, `arraysize` if `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Interface` for a non-positive size or if no cursor
    /// is open, and `Error::Operational` if the server no longer knows it.
    pub async fn fetchmany(&mut self, size: Option<i64>) -> Result<Vec<Row>> {
        let id = self.open_id("fetchmany")?;
        let size = size.unwrap_or(self.arraysize);
        if size <= 0 {
            return Err(Error::Interface(
                "Size must be a positive integer".to_string(),
            ));
        }

        let page = self.conn.api.fetch_many(&id, size).await?;
        self.rowcount = position(page.position);
        Ok(page.data)
    }

    /// Fetches every remaining row.
    ///
    /// # Errors
    ///
    /// Returns `Error::Interface` if no cursor is open and
    /// `Error::Operational` if the server no longer knows it.
    pub async fn fetchall(&mut self) -> Result<Vec<Row>> {
        let id = self.open_id("fetchall")?;
        let page = self.conn.api.fetch_all(&id).await?;
        self.rowcount = position(page.position);
        Ok(page.data)
    }

    /// Releases the server cursor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the connection is closed or no cursor
    /// is open.
    pub async fn close(&mut self) -> Result<()> {
        self.conn.ensure_online("close")?;
        let Some(id) = self.cursor_id.take() else {
            return Err(Error::Internal(
                "Cursor is not open or already closed. Call execute() first".to_string(),
            ));
        };

        self.description = None;
        self.rowcount = -1;
        self.conn.api.close(&id).await?;
        debug!(cursor_id = %id, "Cursor closed");
        Ok(())
    }
}

fn position(position: u64) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}
