//! Request handlers for the query and auth endpoints.

use std::sync::Arc;

use dbcsv_auth::AuthError;
use dbcsv_core::protocol::{
    ColumnDescription, ExecuteRequest, ExecuteResponse, FetchManyResponse, FetchOneResponse,
    StatusResponse, TokenResponse, STATUS_SUCCESS,
};
use dbcsv_core::EngineError;
use tracing::{debug, error, info, warn};

use crate::error::RegistryError;
use crate::registry::CursorRegistry;
use crate::http::{Request, Response};
use crate::state::AppState;

/// Text returned by `GET /`.
pub const BANNER: &str = "This is for database engine!";

fn cursor_id(req: &Request) -> &str {
    req.params.get("cursor_id").unwrap_or_default()
}

fn registry_error(err: &RegistryError) -> Response {
    debug!(error = %err, "Cursor lookup failed");
    Response::detail(404, err.to_string())
}

/// Runs a registry call on the blocking pool, since advancing a cursor
/// reads its table file.
async fn on_registry<T, F>(state: &Arc<AppState>, call: F) -> Result<T, Response>
where
    F: FnOnce(&CursorRegistry) -> Result<T, RegistryError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || call(&state.registry)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(registry_error(&err)),
        Err(err) => {
            error!(error = %err, "Cursor task failed");
            Err(Response::internal_server_error())
        }
    }
}

/// `GET /`
pub async fn root(_req: Request, _state: Arc<AppState>) -> Response {
    Response::json(&BANNER)
}

/// `GET /query/ping?schema=S`
pub async fn ping(req: Request, state: Arc<AppState>) -> Response {
    let Some(schema) = req.get_query("schema") else {
        return Response::bad_request("Missing query parameter: schema");
    };

    if !state.engine.has_schema(schema) {
        return Response::detail(
            404,
            format!(
                "Schema {schema} not found, please check the schema name in your dsn string. \
                 Available schemas: {}",
                state.engine.schemas().join(", ")
            ),
        );
    }

    Response::json(&StatusResponse::success(Some(format!(
        "Schema {schema} is available."
    ))))
}

/// `POST /auth/connect` with a form body of `username` and `password`.
pub async fn connect(req: Request, state: Arc<AppState>) -> Response {
    let form = req.form();
    let (Some(username), Some(password)) = (form.get("username"), form.get("password")) else {
        return Response::bad_request("Form fields username and password are required");
    };

    match state.accounts.authenticate(username, password) {
        Ok(account) => {
            let issued = state.sessions.issue(&account.username);
            info!(user = %account.username, "Issued access token");
            Response::json(&TokenResponse::from(issued))
        }
        Err(err) => {
            warn!(user = %username, error = %err, "Login rejected");
            Response::unauthorized(err.to_string())
        }
    }
}

/// `POST /auth/refresh` with the current bearer token.
pub async fn refresh(req: Request, state: Arc<AppState>) -> Response {
    let Some(token) = req.bearer_token() else {
        return Response::unauthorized("Not authenticated");
    };

    match state.sessions.refresh(token) {
        Ok(issued) => Response::json(&TokenResponse::from(issued)),
        Err(err @ (AuthError::SessionNotFound | AuthError::SessionExpired)) => {
            warn!(error = %err, "Refresh rejected");
            Response::forbidden(err.to_string())
        }
        Err(err) => Response::detail(500, err.to_string()),
    }
}

/// `POST /query/execute`
pub async fn execute(req: Request, state: Arc<AppState>) -> Response {
    let body: ExecuteRequest = match req.json() {
        Ok(body) => body,
        Err(err) => return Response::bad_request(format!("Invalid request body: {err}")),
    };

    let execution = match state.engine.execute(&body.sql_statement, &body.schema) {
        Ok(execution) => execution,
        Err(err) => {
            warn!(schema = %body.schema, error = %err, "Execute failed");
            let status = match err {
                EngineError::SchemaNotFound { .. } => 404,
                _ => 400,
            };
            return Response::detail(status, err.to_string());
        }
    };

    let description = execution
        .description
        .into_iter()
        .map(|column| ColumnDescription {
            name: column.name,
            type_code: column.declared_type,
        })
        .collect();
    let cursor_id = state.registry.create(execution.rows);
    info!(
        cursor_id = %cursor_id,
        user = req.user.as_deref().unwrap_or("-"),
        "Opened cursor"
    );

    Response::json(&ExecuteResponse {
        status: STATUS_SUCCESS.to_string(),
        cursor_id,
        position: 0,
        description,
    })
}

/// `GET /query/fetchone/{cursor_id}`
pub async fn fetch_one(req: Request, state: Arc<AppState>) -> Response {
    let id = cursor_id(&req).to_owned();
    match on_registry(&state, move |registry| registry.advance_one(&id)).await {
        Ok((data, position)) => Response::json(&FetchOneResponse {
            status: STATUS_SUCCESS.to_string(),
            data,
            position,
        }),
        Err(res) => res,
    }
}

/// `GET /query/fetchmany/{cursor_id}?size=N`
pub async fn fetch_many(req: Request, state: Arc<AppState>) -> Response {
    let size = match req.get_query("size") {
        None => state.fetch_many_default,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(size) => size,
            Err(_) => return Response::bad_request(format!("Invalid size: '{raw}'")),
        },
    };

    let id = cursor_id(&req).to_owned();
    match on_registry(&state, move |registry| registry.advance_many(&id, size)).await {
        Ok((data, position)) => Response::json(&FetchManyResponse {
            status: STATUS_SUCCESS.to_string(),
            data,
            position,
        }),
        Err(res) => res,
    }
}

/// `GET /query/fetchall/{cursor_id}`
pub async fn fetch_all(req: Request, state: Arc<AppState>) -> Response {
    let id = cursor_id(&req).to_owned();
    match on_registry(&state, move |registry| registry.drain_all(&id)).await {
        Ok((data, position)) => Response::json(&FetchManyResponse {
            status: STATUS_SUCCESS.to_string(),
            data,
            position,
        }),
        Err(res) => res,
    }
}

/// `DELETE /query/close/{cursor_id}`
pub async fn close(req: Request, state: Arc<AppState>) -> Response {
    let id = cursor_id(&req).to_owned();
    match on_registry(&state, move |registry| registry.close(&id)).await {
        Ok(()) => Response::json(&StatusResponse::success(None)),
        Err(res) => res,
    }
}
