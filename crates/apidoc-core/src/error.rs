//! Error types for apidoc

use apidoc_openapi::versioning::VersionError;
use http::StatusCode;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for apidoc operations
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Standard API error type
///
/// Provides structured error responses following a consistent JSON format:
/// `{"error":{"type":"...","message":"..."}}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error type identifier
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Internal details, logged but never sent
    pub(crate) internal: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(
        status: StatusCode,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
            internal: None,
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Create a 405 Method Not Allowed error
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", message)
    }

    /// Create a 413 Payload Too Large error
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", message)
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// Add internal details (logged, never part of the response)
    pub fn with_internal(mut self, details: impl Into<String>) -> Self {
        self.internal = Some(details.into());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON representation of API error response
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            error: ErrorBody {
                error_type: err.error_type,
                message: err.message,
            },
        }
    }
}

// Conversion from common error types
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<VersionError> for ApiError {
    fn from(err: VersionError) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, err.error_type(), err.to_string())
    }
}

/// Error starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// The bind address could not be parsed
    #[error("invalid bind address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding or accepting failed
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidoc_openapi::versioning::ApiVersion;

    #[test]
    fn test_version_errors_are_bad_requests() {
        let err: ApiError = VersionError::Unsupported {
            requested: ApiVersion::new(3, 0),
            supported: vec![ApiVersion::v1(), ApiVersion::v2()],
        }
        .into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type, "unsupported_api_version");
        assert!(err.message.contains("3.0"));

        let err: ApiError = VersionError::Unspecified.into();
        assert_eq!(err.error_type, "api_version_unspecified");
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorResponse::from(ApiError::not_found("nope").with_internal("secret"));
        let json = serde_json::to_value(body).unwrap();

        assert_eq!(json["error"]["type"], "not_found");
        assert_eq!(json["error"]["message"], "nope");
        assert!(json.to_string().find("secret").is_none());
    }
}
