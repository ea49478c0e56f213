//! The cursor registry: open row sequences addressed by id.
//!
//! Each entry carries its own lock, so fetches on different cursors run in
//! parallel while fetches on the same cursor are serialized. The map lock is
//! only held long enough to look an entry up, insert it or remove it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use dbcsv_core::protocol::Row;
use dbcsv_core::RowSequence;
use tracing::debug;
use uuid::Uuid;

use crate::error::RegistryError;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// A live cursor: its remaining rows and how many were delivered.
#[derive(Debug)]
struct CursorState {
    rows: RowSequence,
    position: u64,
}

impl CursorState {
    fn take(&mut self, limit: usize) -> Vec<Row> {
        let rows: Vec<Row> = self.rows.by_ref().take(limit).collect();
        self.position += rows.len() as u64;
        rows
    }
}

type Entry = Arc<Mutex<CursorState>>;

/// Shared store of open cursors.
#[derive(Debug, Default)]
pub struct CursorRegistry {
    cursors: RwLock<HashMap<String, Entry>>,
}

impl CursorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a row sequence at position 0 and returns its new id.
    pub fn create(&self, rows: RowSequence) -> String {
        let id = Uuid::new_v4().to_string();
        let state = CursorState { rows, position: 0 };
        self.cursors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::new(Mutex::new(state)));
        debug!(cursor_id = %id, "Cursor created");
        id
    }

    fn entry(&self, id: &str) -> Result<Entry> {
        self.cursors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    fn with_cursor<T>(&self, id: &str, f: impl FnOnce(&mut CursorState) -> T) -> Result<T> {
        let entry = self.entry(id)?;
        let mut state = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut state))
    }

    /// Pulls one row. Returns `None` at the end, with the position unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown id.
    pub fn advance_one(&self, id: &str) -> Result<(Option<Row>, u64)> {
        self.with_cursor(id, |state| {
            let row = state.take(1).pop();
            (row, state.position)
        })
    }

    /// Pulls up to `n` rows; a non-positive `n` reads nothing.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown id.
    pub fn advance_many(&self, id: &str, n: i64) -> Result<(Vec<Row>, u64)> {
        let limit = usize::try_from(n).unwrap_or(0);
        self.with_cursor(id, |state| {
            let rows = state.take(limit);
            (rows, state.position)
        })
    }

    /// Pulls every remaining row.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown id.
    pub fn drain_all(&self, id: &str) -> Result<(Vec<Row>, u64)> {
        self.with_cursor(id, |state| {
            let rows = state.take(usize::MAX);
            (rows, state.position)
        })
    }

    /// Removes a cursor and releases its table file.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown or closed id.
    pub fn close(&self, id: &str) -> Result<()> {
        let entry = self
            .cursors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rows
            .close();
        debug!(cursor_id = %id, "Cursor closed");
        Ok(())
    }

    /// Returns the number of open cursors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no cursor is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
