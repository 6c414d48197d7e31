//! Standard error schemas for OpenAPI documentation
//!
//! These schemas match the error response format used by `apidoc-core`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorSchema {
    /// The error details
    pub error: ErrorBodySchema,
}

/// Error body details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBodySchema {
    /// Error type identifier (e.g., "invalid_api_version", "not_found")
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
}
