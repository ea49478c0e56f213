//! The HTTP/1 serve loop bridging hyper and the router.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::http::{Method, Request, Response, Router};

/// Converts a hyper request, runs it through the router and converts back.
async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    router: Arc<Router>,
) -> std::result::Result<HyperResponse<Full<Bytes>>, Infallible> {
    let method = Method::from_str(req.method().as_str());
    let response = match method {
        Some(method) => {
            let uri = req.uri();
            let mut request = Request::new(method, uri.path());

            if let Some(query) = uri.query() {
                request.query = Request::parse_query_string(query);
            }

            for (key, value) in req.headers() {
                if let Ok(v) = value.to_str() {
                    request.headers.insert(key.to_string(), v.to_string());
                }
            }

            match req.collect().await {
                Ok(body) => {
                    request.body = body.to_bytes().to_vec();
                    router.handle(request).await
                }
                Err(err) => Response::bad_request(format!("Cannot read request body: {err}")),
            }
        }
        None => Response::method_not_allowed(),
    };

    Ok(into_hyper(response))
}

fn into_hyper(response: Response) -> HyperResponse<Full<Bytes>> {
    let mut builder = HyperResponse::builder().status(
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );

    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    builder
        .body(Full::new(Bytes::from(response.body)))
        .unwrap_or_else(|err| {
            error!(error = %err, "Invalid response");
            let mut fallback = HyperResponse::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

/// Accepts connections until `shutdown` resolves.
///
/// Each connection is served on its own task.
///
/// # Errors
///
/// Returns an error if the listener fails to accept.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!("Listening on http://{addr}");

    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            () = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        };
        debug!(%peer, "Accepted connection");

        let io = TokioIo::new(stream);
        let router = router.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle_request(req, router.clone()));

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %err, "Error serving connection");
            }
        });
    }
}
