//! Middleware support for request/response processing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dbcsv_auth::{AuthError, SessionStore};
use tracing::{debug, info, warn};

use super::request::Request;
use super::response::Response;

/// A boxed future for async middleware operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of middleware processing.
pub enum MiddlewareResult {
    /// Continue to the next middleware/handler.
    Continue(Request),
    /// Stop processing and return this response.
    Response(Response),
}

/// Trait for middleware that processes requests and responses.
///
/// Middleware can:
/// - Modify the request before it reaches the handler
/// - Short-circuit processing and return a response
/// - Modify the response after the handler runs
pub trait Middleware: Send + Sync {
    /// Called before the request handler.
    ///
    /// Can modify the request or short-circuit with a response.
    fn before<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, MiddlewareResult>;

    /// Called after the request handler.
    ///
    /// Can modify the response.
    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response>;
}

/// Middleware that requires a valid bearer token on selected paths.
///
/// On success the verified username is stored in [`Request::user`].
pub struct BearerAuthMiddleware {
    sessions: Arc<SessionStore>,
    /// Paths that require a token.
    protected: Vec<String>,
}

impl BearerAuthMiddleware {
    /// Creates auth middleware backed by a session store.
    pub const fn new(sessions: Arc<SessionStore>) -> Self {
        Self {
            sessions,
            protected: Vec::new(),
        }
    }

    /// Adds path prefixes that require a token.
    #[must_use]
    pub fn protect(mut self, paths: &[&str]) -> Self {
        self.protected
            .extend(paths.iter().map(|s| (*s).to_string()));
        self
    }

    /// Checks if a path requires a token.
    fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|p| path.starts_with(p))
    }
}

impl Middleware for BearerAuthMiddleware {
    fn before<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            if !self.is_protected(&req.path) {
                return MiddlewareResult::Continue(req.clone());
            }

            let Some(token) = req.bearer_token() else {
                return MiddlewareResult::Response(Response::unauthorized("Not authenticated"));
            };

            match self.sessions.verify(token) {
                Ok(session) => {
                    debug!(user = %session.username, path = %req.path, "Authenticated request");
                    let mut req = req.clone();
                    req.user = Some(session.username);
                    MiddlewareResult::Continue(req)
                }
                Err(err @ (AuthError::SessionExpired | AuthError::SessionNotFound)) => {
                    warn!(path = %req.path, error = %err, "Rejected bearer token");
                    MiddlewareResult::Response(Response::unauthorized(err.to_string()))
                }
                Err(err) => MiddlewareResult::Response(Response::unauthorized(err.to_string())),
            }
        })
    }

    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move { res })
    }
}

/// Middleware that logs requests.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            info!("--> {} {}", req.method, req.path);
            MiddlewareResult::Continue(req.clone())
        })
    }

    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if res.status >= 400 {
                warn!("<-- {}", res.status);
            } else {
                info!("<-- {}", res.status);
            }
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> (Arc<SessionStore>, BearerAuthMiddleware) {
        let sessions = Arc::new(SessionStore::default());
        let mw = BearerAuthMiddleware::new(sessions.clone()).protect(&["/query/execute"]);
        (sessions, mw)
    }

    #[test]
    fn test_protected_paths() {
        let (_, mw) = auth();
        assert!(mw.is_protected("/query/execute"));
        assert!(!mw.is_protected("/query/fetchone/1"));
        assert!(!mw.is_protected("/auth/connect"));
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (_, mw) = auth();
        let req = Request::post("/query/execute");
        match mw.before(&req).await {
            MiddlewareResult::Response(res) => assert_eq!(res.status, 401),
            MiddlewareResult::Continue(_) => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_valid_token_sets_user() {
        let (sessions, mw) = auth();
        let issued = sessions.issue("johndoe");
        let req = Request::post("/query/execute")
            .header("Authorization", format!("Bearer {}", issued.token));
        match mw.before(&req).await {
            MiddlewareResult::Continue(req) => assert_eq!(req.user.as_deref(), Some("johndoe")),
            MiddlewareResult::Response(res) => panic!("unexpected {}", res.status),
        }
    }

    #[tokio::test]
    async fn test_unprotected_passes_through() {
        let (_, mw) = auth();
        let req = Request::get("/query/ping");
        assert!(matches!(mw.before(&req).await, MiddlewareResult::Continue(_)));
    }
}
