//! Tracing middleware
//!
//! Wraps each request in an `http_request` span carrying method, path,
//! response status, duration and any custom fields.

use super::layer::{BoxedNext, MiddlewareLayer};
use crate::request::Request;
use crate::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::{info_span, Instrument, Level};

/// Middleware layer that creates tracing spans for requests
///
/// # Example
///
/// ```rust,ignore
/// use apidoc_core::middleware::TracingLayer;
///
/// App::new()
///     .layer(TracingLayer::new().with_field("service", "my-api"))
///     .route("/", get(handler))
/// ```
#[derive(Clone)]
pub struct TracingLayer {
    level: Level,
    custom_fields: Vec<(String, String)>,
}

impl TracingLayer {
    /// Create a new TracingLayer with default INFO level
    pub fn new() -> Self {
        Self::with_level(Level::INFO)
    }

    /// Create a TracingLayer that logs successful requests at `level`
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            custom_fields: Vec::new(),
        }
    }

    /// Add a custom field to all request spans
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.push((key.into(), value.into()));
        self
    }

    fn fields_string(&self) -> String {
        self.custom_fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TracingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewareLayer for TracingLayer {
    fn call(
        &self,
        req: Request,
        next: BoxedNext,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'static>> {
        let level = self.level;
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let fields = self.fields_string();

        Box::pin(async move {
            let start = Instant::now();

            let span = info_span!(
                "http_request",
                method = %method,
                path = %path,
                fields = %fields,
                status = tracing::field::Empty,
                duration_ms = tracing::field::Empty,
            );

            let response = next(req).instrument(span.clone()).await;

            let duration_ms = start.elapsed().as_millis() as u64;
            let status = response.status();
            span.record("status", status.as_u16());
            span.record("duration_ms", duration_ms);

            let _enter = span.enter();
            if status.is_client_error() || status.is_server_error() {
                tracing::warn!(status = status.as_u16(), duration_ms, "Request failed");
            } else {
                match level {
                    Level::TRACE => {
                        tracing::trace!(status = status.as_u16(), duration_ms, "Request completed")
                    }
                    Level::DEBUG => {
                        tracing::debug!(status = status.as_u16(), duration_ms, "Request completed")
                    }
                    Level::INFO => {
                        tracing::info!(status = status.as_u16(), duration_ms, "Request completed")
                    }
                    Level::WARN => {
                        tracing::warn!(status = status.as_u16(), duration_ms, "Request completed")
                    }
                    Level::ERROR => {
                        tracing::error!(status = status.as_u16(), duration_ms, "Request completed")
                    }
                }
            }

            response
        })
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}
