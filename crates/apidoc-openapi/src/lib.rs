//! OpenAPI documentation for apidoc applications
//!
//! This crate builds OpenAPI 3.0 documents, one per API version group, and
//! serves an interactive Scalar API reference over them. It wraps `utoipa`
//! for schema derivation while keeping its own document model.
//!
//! # Features
//!
//! - Per-version OpenAPI documents at `/openapi/{group}.json`
//! - Scalar API reference at `/help`
//! - API version readers (query string, URL segment, header, media type)
//! - Schema derivation via `#[derive(Schema)]`
//! - Optional annotation file to enrich operation docs
//!
//! # Usage
//!
//! ```rust,ignore
//! use apidoc_rs::prelude::*;
//!
//! #[derive(Serialize, Schema)]
//! struct User {
//!     id: i32,
//!     name: String,
//! }
//!
//! App::new()
//!     .api_versioning(ApiVersioningOptions::new().assume_default_version_when_unspecified(true))
//!     .versioned_route("/api/users", ApiVersion::v1(), get(list_users))
//!     .api_reference(ApiReferenceConfig::new("Users API"))
//!     .run("127.0.0.1:8080")
//!     .await
//! ```

mod annotations;
mod config;
#[cfg(feature = "api-reference")]
mod reference;
mod schemas;
mod spec;
pub mod versioning;

pub use annotations::{AnnotationError, Annotations, OperationAnnotation};
pub use config::{ApiReferenceConfig, HttpClientTarget, Theme};
pub use schemas::{ErrorBodySchema, ErrorSchema};
pub use spec::{
    ApiInfo, MediaType, OpenApiSpec, Operation, Parameter, PathItem, RequestBody, ResponseSpec,
    SchemaRef,
};

// Re-export utoipa's ToSchema derive macro as Schema
pub use utoipa::ToSchema as Schema;

// Re-export utoipa types for advanced usage
pub mod utoipa_types {
    pub use utoipa::{openapi, ToSchema};
}

use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use http_body_util::Full;

/// Generate OpenAPI JSON response
pub fn openapi_json(spec: &OpenApiSpec) -> Response<Full<Bytes>> {
    match serde_json::to_string_pretty(&spec.to_json()) {
        Ok(json) => with_content_type(json, "application/json"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize OpenAPI document");
            let mut response = Response::new(Full::new(Bytes::from_static(
                b"Failed to serialize OpenAPI document",
            )));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

/// Generate Scalar API reference HTML response
#[cfg(feature = "api-reference")]
pub fn api_reference_html(config: &ApiReferenceConfig, groups: &[String]) -> Response<Full<Bytes>> {
    let html = reference::generate_reference_html(config, groups);
    with_content_type(html, "text/html; charset=utf-8")
}

fn with_content_type(body: String, content_type: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
