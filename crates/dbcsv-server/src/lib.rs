//! HTTP server for the dbcsv query engine.
//!
//! Clients log in for a bearer token, open a cursor with `POST /query/execute`
//! and page through its rows with the fetch endpoints. Open cursors live in a
//! [`CursorRegistry`] owned by the process.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dbcsv_auth::{AccountStore, SessionStore};
//! use dbcsv_core::Engine;
//! use dbcsv_server::{build_router, serve, AppState};
//!
//! # async fn run() -> dbcsv_server::Result<()> {
//! let engine = Engine::open("data")?;
//! let state = AppState::new(engine, AccountStore::default(), SessionStore::default());
//! let router = Arc::new(build_router(Arc::new(state)));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8001").await?;
//! serve(listener, router, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod registry;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{RegistryError, Result, ServerError};
pub use registry::CursorRegistry;
pub use routes::build_router;
pub use server::serve;
pub use state::AppState;
