//! Versioned HelloWorld API
//!
//! Serves `GET /api/HelloWorld` and `GET /api/{version}/HelloWorld` in
//! versions 1.0 and 2.0, with one OpenAPI document per version and a Scalar
//! API reference at `/help`.

pub mod config;
pub mod controllers;
pub mod startup;
