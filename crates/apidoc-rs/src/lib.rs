//! # apidoc
//!
//! Versioned REST endpoints with generated API documentation.
//!
//! Routes are registered per API version. Each request is dispatched on the
//! version found in the query string, a URL segment, a header or a
//! media-type parameter. One OpenAPI document per version is generated at
//! startup and browsed through a Scalar API reference.
//!
//! ## Quick Start
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
//! async fn list_users() -> Json<Vec<User>> {
//!     Json(vec![User { id: 1, name: "John Doe".to_string() }])
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), ServerError> {
//!     App::new()
//!         .api_versioning(
//!             ApiVersioningOptions::new()
//!                 .assume_default_version_when_unspecified(true)
//!                 .report_api_versions(true),
//!         )
//!         .versioned_route("/api/users", ApiVersion::v1(), get(list_users))
//!         .api_reference(ApiReferenceConfig::new("Users API").theme(Theme::Mars))
//!         .run("127.0.0.1:8080")
//!         .await
//! }
//! ```
//!
//! ## Features
//!
//! - `api-reference` (default) - serve the Scalar reference page
//! - `test-utils` - in-process `TestClient`

// Re-export core functionality
pub use apidoc_core::*;

pub use apidoc_openapi::versioning;
pub use apidoc_openapi::{
    ApiReferenceConfig, HttpClientTarget, OpenApiSpec, Operation, Parameter, ResponseSpec,
    SchemaRef, Theme,
};

/// Prelude module - import everything you need with `use apidoc_rs::prelude::*`
pub mod prelude {
    // Core types
    pub use apidoc_core::{
        delete,
        get,
        patch,
        post,
        put,
        // Error handling
        ApiError,
        // App builder
        App,
        Headers,
        Html,
        // Response types
        IntoResponse,
        // Extractors
        Json,
        MethodRouter,
        Query,
        Request,
        RequestedApiVersion,
        Response,
        Result,
        Router,
        ServerError,
        State,
        // Middleware
        TracingLayer,
    };

    #[cfg(feature = "test-utils")]
    pub use apidoc_core::{TestClient, TestRequest, TestResponse};

    // Versioning
    pub use apidoc_openapi::versioning::{
        ApiVersion, ApiVersionReader, ApiVersioningOptions, VersionSource,
    };

    // Documentation
    pub use apidoc_openapi::{ApiReferenceConfig, HttpClientTarget, Operation, Schema, Theme};

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[derive(Serialize, Schema)]
    struct User {
        id: i32,
        name: String,
    }

    async fn list_users() -> Json<Vec<User>> {
        Json(vec![User {
            id: 1,
            name: "John Doe".to_string(),
        }])
    }

    #[test]
    fn prelude_imports_work() {
        let _: fn() -> Result<()> = || Ok(());
    }

    #[test]
    fn prelude_builds_a_versioned_app() {
        let docs = App::new()
            .without_annotations()
            .api_versioning(ApiVersioningOptions::new().default_version(ApiVersion::v1()))
            .versioned_route(
                "/api/users",
                ApiVersion::v1(),
                get(list_users).operation(
                    Operation::new()
                        .operation_id("GetUsers")
                        .json_array_response::<User>(200, "Users"),
                ),
            )
            .openapi_documents();

        let json = docs["v1"].to_json();
        assert!(json["components"]["schemas"].get("User").is_some());
    }
}
