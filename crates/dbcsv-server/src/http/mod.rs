//! A small router with path parameters and middleware.

mod middleware;
mod path;
mod request;
mod response;
mod router;

pub use middleware::{BearerAuthMiddleware, BoxFuture, LoggingMiddleware, Middleware, MiddlewareResult};
pub use path::PathPattern;
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::{Handler, Route, Router};
