//! Middleware infrastructure for apidoc
//!
//! Middleware is added with `App::layer` and wraps every routed request,
//! including version dispatch and the documentation endpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use apidoc_core::middleware::TracingLayer;
//!
//! App::new()
//!     .layer(TracingLayer::new().with_field("service", "users"))
//!     .route("/", get(handler))
//!     .run("127.0.0.1:8080")
//!     .await
//! ```

mod layer;
mod tracing_layer;

pub use layer::{BoxedNext, LayerStack, MiddlewareLayer};
pub use tracing_layer::TracingLayer;

/// Default request body limit (1 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
