//! Versioning options and per-route version sets
//!
//! [`ApiVersioningOptions`] is the one-shot configuration applied at startup:
//! default version, whether to assume it, whether to report versions, and
//! which readers to consult. [`ApiVersionSet`] describes the versions one
//! logical route is mapped to.

use super::error::VersionError;
use super::reader::{ApiVersionReader, ExtractedVersion, RequestView, VersionSource};
use super::version::ApiVersion;
use http::{HeaderName, HeaderValue};
use std::collections::BTreeSet;

/// Response header listing the supported versions of a route
pub const API_SUPPORTED_VERSIONS: HeaderName = HeaderName::from_static("api-supported-versions");

/// Response header listing the deprecated versions of a route
pub const API_DEPRECATED_VERSIONS: HeaderName =
    HeaderName::from_static("api-deprecated-versions");

/// API versioning configuration
///
/// # Example
///
/// ```rust,ignore
/// use apidoc_openapi::versioning::{ApiVersion, ApiVersionReader, ApiVersioningOptions};
///
/// let options = ApiVersioningOptions::new()
///     .default_version(ApiVersion::new(1, 0))
///     .assume_default_version_when_unspecified(true)
///     .report_api_versions(true)
///     .reader(ApiVersionReader::combine([
///         ApiVersionReader::query_string("version"),
///         ApiVersionReader::url_segment(),
///         ApiVersionReader::header("X-API-Version"),
///         ApiVersionReader::media_type("version"),
///     ]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersioningOptions {
    /// Version used when a request does not specify one
    pub default_version: ApiVersion,
    /// Whether an unspecified version resolves to `default_version`
    pub assume_default_version_when_unspecified: bool,
    /// Whether versioned responses carry the supported/deprecated headers
    pub report_api_versions: bool,
    /// Readers consulted to find the requested version
    pub reader: ApiVersionReader,
}

impl ApiVersioningOptions {
    /// Options with framework defaults: version 1.0 that is not assumed, no
    /// reporting, `api-version` query or URL segment reader.
    pub fn new() -> Self {
        Self {
            default_version: ApiVersion::v1(),
            assume_default_version_when_unspecified: false,
            report_api_versions: false,
            reader: ApiVersionReader::default(),
        }
    }

    /// Set the default version
    pub fn default_version(mut self, version: ApiVersion) -> Self {
        self.default_version = version;
        self
    }

    /// Assume the default version when a request specifies none
    pub fn assume_default_version_when_unspecified(mut self, assume: bool) -> Self {
        self.assume_default_version_when_unspecified = assume;
        self
    }

    /// Report supported and deprecated versions in response headers
    pub fn report_api_versions(mut self, report: bool) -> Self {
        self.report_api_versions = report;
        self
    }

    /// Set the version reader
    pub fn reader(mut self, reader: ApiVersionReader) -> Self {
        self.reader = reader;
        self
    }

    /// Determine which version a request asks for
    ///
    /// This does not check whether any handler is mapped to that version.
    pub fn requested_version(&self, req: &RequestView<'_>) -> Result<ExtractedVersion, VersionError> {
        match self.reader.read(req)? {
            Some(extracted) => Ok(extracted),
            None if self.assume_default_version_when_unspecified => Ok(ExtractedVersion {
                version: self.default_version,
                source: VersionSource::Default,
            }),
            None => Err(VersionError::Unspecified),
        }
    }
}

impl Default for ApiVersioningOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Versions one logical route is mapped to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiVersionSet {
    supported: BTreeSet<ApiVersion>,
    deprecated: BTreeSet<ApiVersion>,
}

impl ApiVersionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a supported version
    pub fn supported(mut self, version: ApiVersion) -> Self {
        self.insert(version, false);
        self
    }

    /// Declare a deprecated version
    pub fn deprecated(mut self, version: ApiVersion) -> Self {
        self.insert(version, true);
        self
    }

    /// Declare a version in place
    ///
    /// A version declared supported anywhere is never reported as deprecated.
    pub fn insert(&mut self, version: ApiVersion, deprecated: bool) {
        if deprecated {
            if !self.supported.contains(&version) {
                self.deprecated.insert(version);
            }
        } else {
            self.deprecated.remove(&version);
            self.supported.insert(version);
        }
    }

    /// Whether the version is declared at all
    pub fn contains(&self, version: &ApiVersion) -> bool {
        self.supported.contains(version) || self.deprecated.contains(version)
    }

    /// Whether the version is declared deprecated
    pub fn is_deprecated(&self, version: &ApiVersion) -> bool {
        self.deprecated.contains(version)
    }

    /// All declared versions in ascending order
    pub fn all(&self) -> Vec<ApiVersion> {
        let mut all: Vec<_> = self.supported.union(&self.deprecated).copied().collect();
        all.sort();
        all
    }

    /// Supported (non-deprecated) versions in ascending order
    pub fn supported_versions(&self) -> impl Iterator<Item = &ApiVersion> {
        self.supported.iter()
    }

    /// Deprecated versions in ascending order
    pub fn deprecated_versions(&self) -> impl Iterator<Item = &ApiVersion> {
        self.deprecated.iter()
    }

    /// Headers reporting this set, e.g. `api-supported-versions: 1.0, 2.0`
    pub fn report_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = Vec::with_capacity(2);

        if let Some(value) = join_versions(self.supported.iter()) {
            headers.push((API_SUPPORTED_VERSIONS, value));
        }
        if let Some(value) = join_versions(self.deprecated.iter()) {
            headers.push((API_DEPRECATED_VERSIONS, value));
        }

        headers
    }
}

fn join_versions<'a>(versions: impl Iterator<Item = &'a ApiVersion>) -> Option<HeaderValue> {
    let joined = versions
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        None
    } else {
        HeaderValue::from_str(&joined).ok()
    }
}
