//! Versioning errors

use super::version::ApiVersion;
use super::reader::VersionSource;
use thiserror::Error;

/// Error type for version parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// Empty version string
    #[error("empty version string")]
    Empty,
    /// A version component is not an unsigned number
    #[error("invalid number in version")]
    InvalidNumber,
    /// More than two components
    #[error("invalid version format")]
    InvalidFormat,
}

/// Failure to resolve the API version of a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// No version was given and no default may be assumed
    #[error("an API version is required, but was not specified")]
    Unspecified,

    /// A reader found a value that is not a valid version
    #[error("the {source_kind} value '{value}' is not a valid API version: {reason}")]
    Invalid {
        /// Raw value as found in the request
        value: String,
        /// Where the value came from
        source_kind: VersionSource,
        /// Parse failure
        reason: VersionParseError,
    },

    /// The version is well-formed but no handler is mapped to it
    #[error("the requested API version '{requested}' is not supported")]
    Unsupported {
        /// The requested version
        requested: ApiVersion,
        /// Versions the route does support
        supported: Vec<ApiVersion>,
    },
}

impl VersionError {
    /// Stable identifier used in error response bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Unspecified => "api_version_unspecified",
            Self::Invalid { .. } => "invalid_api_version",
            Self::Unsupported { .. } => "unsupported_api_version",
        }
    }
}
