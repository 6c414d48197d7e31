//! # apidoc core
//!
//! Core library providing the HTTP server, router, extractors and API
//! version dispatch for apidoc.
//!
//! This crate is not meant to be used directly. Use `apidoc-rs` instead.

mod app;
mod error;
mod extract;
mod handler;
pub mod middleware;
mod request;
mod response;
mod router;
mod server;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;
mod versioned;

// Public API
pub use app::App;
pub use error::{ApiError, Result, ServerError};
pub use extract::{FromRequest, FromRequestParts, Headers, Json, Query, RequestedApiVersion, State};
pub use handler::Handler;
pub use middleware::{TracingLayer, DEFAULT_BODY_LIMIT};
pub use request::Request;
pub use response::{Html, IntoResponse, Response};
pub use router::{delete, get, patch, post, put, MethodRouter, RouteConflictError, RouteInfo, Router};
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};

pub use apidoc_openapi;
