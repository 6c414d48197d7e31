//! HTTP server implementation

use crate::error::{ApiError, ServerError};
use crate::middleware::{BoxedNext, LayerStack};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::{RouteMatch, Router};
use bytes::Bytes;
use http::request::Parts;
use http::{header, HeaderValue, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Router, layers and body limit shared by every connection
pub(crate) struct Pipeline {
    router: Router,
    layers: LayerStack,
    body_limit: Option<usize>,
}

impl Pipeline {
    pub(crate) fn new(router: Router, layers: LayerStack, body_limit: Option<usize>) -> Self {
        Self {
            router,
            layers,
            body_limit,
        }
    }

    pub(crate) fn body_limit(&self) -> Option<usize> {
        self.body_limit
    }

    pub(crate) fn into_router(self) -> Router {
        self.router
    }

    /// Route a request with an already collected body through the layers
    pub(crate) async fn handle(&self, parts: Parts, body: Bytes) -> Response {
        if let Some(limit) = self.body_limit {
            if body.len() > limit {
                return payload_too_large(limit);
            }
        }

        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        let (handler, params) = match self.router.match_route(&path, &method) {
            RouteMatch::Found { handler, params } => (handler.clone(), params),
            RouteMatch::NotFound => {
                return ApiError::not_found(format!("No route found for {} {}", method, path))
                    .into_response();
            }
            RouteMatch::MethodNotAllowed { allowed } => {
                let allowed_str: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                let mut response = ApiError::method_not_allowed(format!(
                    "Method {} not allowed for {}",
                    method, path
                ))
                .into_response();

                if let Ok(value) = HeaderValue::from_str(&allowed_str.join(", ")) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                return response;
            }
        };

        let request = Request::new(parts, body, self.router.state_ref(), params);

        let final_handler: BoxedNext = Arc::new(move |req: Request| {
            let handler = handler.clone();
            Box::pin(async move { handler(req).await })
                as Pin<Box<dyn Future<Output = Response> + Send + 'static>>
        });

        self.layers.execute(request, final_handler).await
    }
}

/// Internal server struct
pub(crate) struct Server {
    pipeline: Arc<Pipeline>,
}

impl Server {
    pub(crate) fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Serve until `signal` completes
    ///
    /// Connections already accepted keep running on their own tasks.
    pub(crate) async fn run_with_shutdown<F>(self, addr: &str, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let addr: SocketAddr = addr.parse().map_err(|source| ServerError::InvalidAddress {
            addr: addr.to_string(),
            source,
        })?;
        let listener = TcpListener::bind(addr).await?;

        info!(address = %addr, "apidoc server running on http://{}", addr);

        tokio::pin!(signal);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = accepted?;
                    let io = TokioIo::new(stream);
                    let pipeline = self.pipeline.clone();

                    tokio::spawn(async move {
                        let service = service_fn(move |req: hyper::Request<Incoming>| {
                            let pipeline = pipeline.clone();
                            async move {
                                Ok::<_, Infallible>(handle_request(&pipeline, req).await)
                            }
                        });

                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                            error!(remote = %remote_addr, "Connection error: {}", err);
                        }
                    });
                }
                _ = &mut signal => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Handle a single HTTP request
async fn handle_request(pipeline: &Pipeline, req: hyper::Request<Incoming>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let (parts, body) = req.into_parts();
    let collected = collect_body(body, pipeline.body_limit()).await;

    let response = match collected {
        Ok(bytes) => pipeline.handle(parts, bytes).await,
        Err(response) => response,
    };

    log_request(&method, &path, response.status(), start);
    response
}

/// Collect a request body, stopping once it grows past `limit`
async fn collect_body<B>(body: B, limit: Option<usize>) -> Result<Bytes, Response>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match limit {
        Some(limit) => match Limited::new(body, limit).collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                Err(payload_too_large(limit))
            }
            Err(e) => Err(read_failed(&e.to_string())),
        },
        None => match body.collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) => {
                let e: BoxError = e.into();
                Err(read_failed(&e.to_string()))
            }
        },
    }
}

fn payload_too_large(limit: usize) -> Response {
    ApiError::payload_too_large(format!("Request body exceeds the limit of {} bytes", limit))
        .into_response()
}

fn read_failed(details: &str) -> Response {
    ApiError::bad_request("Failed to read request body")
        .with_internal(details)
        .into_response()
}

/// Log request completion
fn log_request(method: &http::Method, path: &str, status: StatusCode, start: Instant) {
    let elapsed = start.elapsed();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request rejected"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request completed"
        );
    }
}
