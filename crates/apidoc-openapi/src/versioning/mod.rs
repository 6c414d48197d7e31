//! API versioning
//!
//! - Version parsing and comparison
//! - Version readers (query string, URL segment, header, media type) and
//!   their combination
//! - Versioning options and per-route version sets
//! - One OpenAPI document per version group
//!
//! # Example
//!
//! ```rust,ignore
//! use apidoc_openapi::versioning::{ApiVersion, ApiVersionReader, ApiVersioningOptions};
//!
//! let options = ApiVersioningOptions::new()
//!     .default_version(ApiVersion::v1())
//!     .assume_default_version_when_unspecified(true)
//!     .reader(ApiVersionReader::combine([
//!         ApiVersionReader::query_string("version"),
//!         ApiVersionReader::header("X-API-Version"),
//!     ]));
//! ```

mod error;
mod group;
mod options;
mod reader;
mod version;


pub use error::{VersionError, VersionParseError};
pub use group::{VersionedOperation, VersionedSpecBuilder};
pub use options::{
    ApiVersionSet, ApiVersioningOptions, API_DEPRECATED_VERSIONS, API_SUPPORTED_VERSIONS,
};
pub use reader::{ApiVersionReader, ExtractedVersion, RequestView, VersionSource};
pub use version::ApiVersion;
