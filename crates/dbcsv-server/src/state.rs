//! Shared server state.

use std::sync::Arc;

use dbcsv_auth::{AccountStore, SessionStore};
use dbcsv_core::Engine;

use crate::registry::CursorRegistry;

/// Default page size of `fetchmany` when the request names none.
pub const DEFAULT_FETCH_MANY_SIZE: i64 = 100;

/// Everything a request handler can reach.
#[derive(Debug)]
pub struct AppState {
    pub engine: Engine,
    pub registry: CursorRegistry,
    pub accounts: AccountStore,
    pub sessions: Arc<SessionStore>,
    /// Page size used by `fetchmany` without a `size` parameter.
    pub fetch_many_default: i64,
}

impl AppState {
    /// Creates state with an empty cursor registry.
    #[must_use]
    pub fn new(engine: Engine, accounts: AccountStore, sessions: SessionStore) -> Self {
        Self {
            engine,
            registry: CursorRegistry::new(),
            accounts,
            sessions: Arc::new(sessions),
            fetch_many_default: DEFAULT_FETCH_MANY_SIZE,
        }
    }

    /// Overrides the default `fetchmany` page size.
    #[must_use]
    pub fn with_fetch_many_default(mut self, size: i64) -> Self {
        self.fetch_many_default = size;
        self
    }
}
