//! The route table.

use std::future::Future;
use std::sync::Arc;

use crate::handlers;
use crate::http::{BearerAuthMiddleware, LoggingMiddleware, Request, Response, Router};
use crate::state::AppState;

/// Paths that require a bearer token.
pub const PROTECTED_PATHS: &[&str] = &["/query/execute"];

/// Binds a handler taking shared state to the router's `Fn(Request)` shape.
fn with_state<F, Fut>(
    state: &Arc<AppState>,
    handler: F,
) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(Request, Arc<AppState>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let state = state.clone();
    move |req| handler(req, state.clone())
}

/// Builds the router serving every endpoint.
pub fn build_router(state: Arc<AppState>) -> Router {
    let auth = BearerAuthMiddleware::new(state.sessions.clone()).protect(PROTECTED_PATHS);

    Router::new()
        .middleware(LoggingMiddleware)
        .middleware(auth)
        .get("/", with_state(&state, handlers::root))
        .get("/query/ping", with_state(&state, handlers::ping))
        .post("/auth/connect", with_state(&state, handlers::connect))
        .post("/auth/refresh", with_state(&state, handlers::refresh))
        .post("/query/execute", with_state(&state, handlers::execute))
        .get(
            "/query/fetchone/{cursor_id}",
            with_state(&state, handlers::fetch_one),
        )
        .get(
            "/query/fetchmany/{cursor_id}",
            with_state(&state, handlers::fetch_many),
        )
        .get(
            "/query/fetchall/{cursor_id}",
            with_state(&state, handlers::fetch_all),
        )
        .delete("/query/close/{cursor_id}", with_state(&state, handlers::close))
}
