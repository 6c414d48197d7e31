//! Version readers
//!
//! A reader pulls the requested API version out of one facet of a request:
//! the query string, a URL segment, a header, or a media-type parameter.
//! Readers combine into an ordered list in which the first reader that finds
//! a value wins.

use super::error::VersionError;
use super::version::ApiVersion;
use http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Strategy for reading the API version from requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiVersionReader {
    /// Read the version from a query parameter
    ///
    /// Example: `?version=1.0`
    QueryString {
        /// Query parameter name (matched case-insensitively)
        param: String,
    },

    /// Read the version from a route parameter bound to a URL segment
    ///
    /// Example: `/api/{version}/users` matched by `/api/v1.0/users`
    UrlSegment {
        /// Route parameter name
        param: String,
    },

    /// Read the version from an HTTP header
    ///
    /// Example: `X-API-Version: 1.0`
    Header {
        /// Header name
        name: String,
    },

    /// Read the version from a media-type parameter of `Accept` or
    /// `Content-Type`
    ///
    /// Example: `Accept: application/json; version=2.0`
    MediaType {
        /// Media-type parameter name
        param: String,
    },

    /// Several readers tried in order
    Combined(Vec<ApiVersionReader>),
}

impl ApiVersionReader {
    /// Query string reader with a custom parameter name
    pub fn query_string(param: impl Into<String>) -> Self {
        Self::QueryString {
            param: param.into(),
        }
    }

    /// URL segment reader bound to the `{version}` route parameter
    pub fn url_segment() -> Self {
        Self::url_segment_with_param("version")
    }

    /// URL segment reader bound to a custom route parameter
    pub fn url_segment_with_param(param: impl Into<String>) -> Self {
        Self::UrlSegment {
            param: param.into(),
        }
    }

    /// Header reader
    pub fn header(name: impl Into<String>) -> Self {
        Self::Header { name: name.into() }
    }

    /// Media-type parameter reader
    pub fn media_type(param: impl Into<String>) -> Self {
        Self::MediaType {
            param: param.into(),
        }
    }

    /// Combine readers; they are consulted in the given order
    pub fn combine(readers: impl IntoIterator<Item = ApiVersionReader>) -> Self {
        Self::Combined(readers.into_iter().collect())
    }

    /// Flattened list of the single-facet readers, in consultation order
    pub fn leaves(&self) -> Vec<&ApiVersionReader> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ApiVersionReader>) {
        match self {
            Self::Combined(readers) => {
                for reader in readers {
                    reader.collect_leaves(out);
                }
            }
            leaf => out.push(leaf),
        }
    }

    /// Name of the query parameter this reader consults, if any
    pub fn query_param(&self) -> Option<&str> {
        self.leaves().into_iter().find_map(|r| match r {
            Self::QueryString { param } => Some(param.as_str()),
            _ => None,
        })
    }

    /// Name of the header this reader consults, if any
    pub fn header_name(&self) -> Option<&str> {
        self.leaves().into_iter().find_map(|r| match r {
            Self::Header { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Name of the route parameter this reader consults, if any
    pub fn segment_param(&self) -> Option<&str> {
        self.leaves().into_iter().find_map(|r| match r {
            Self::UrlSegment { param } => Some(param.as_str()),
            _ => None,
        })
    }

    /// Read the requested version
    ///
    /// Returns `Ok(None)` when no reader finds a value. A value that is
    /// present but malformed is an error and does not fall through to the
    /// remaining readers.
    pub fn read(&self, req: &RequestView<'_>) -> Result<Option<ExtractedVersion>, VersionError> {
        let mut leaves = self.leaves().into_iter();
        while let Some(reader) = leaves.next() {
            let Some((raw, source)) = reader.read_raw(req) else {
                continue;
            };

            return match raw.parse::<ApiVersion>() {
                Ok(version) => {
                    for (ignored, ignored_source) in overruled(leaves, version, req) {
                        tracing::debug!(
                            version = %version,
                            source = %source,
                            ignored = %ignored,
                            ignored_source = %ignored_source,
                            "Conflicting API versions in request, first reader wins"
                        );
                    }
                    Ok(Some(ExtractedVersion { version, source }))
                }
                Err(reason) => Err(VersionError::Invalid {
                    value: raw,
                    source_kind: source,
                    reason,
                }),
            };
        }
        Ok(None)
    }

    fn read_raw(&self, req: &RequestView<'_>) -> Option<(String, VersionSource)> {
        let raw = match self {
            Self::QueryString { param } => {
                (query_value(req.query?, param)?, VersionSource::QueryString)
            }
            Self::UrlSegment { param } => {
                (req.route_params.get(param)?.clone(), VersionSource::UrlSegment)
            }
            Self::Header { name } => {
                let value = req.headers.get(name.as_str())?.to_str().ok()?;
                (value.trim().to_string(), VersionSource::Header)
            }
            Self::MediaType { param } => {
                (media_type_value(req.headers, param)?, VersionSource::MediaType)
            }
            Self::Combined(_) => return None,
        };

        if raw.0.is_empty() {
            None
        } else {
            Some(raw)
        }
    }
}

impl Default for ApiVersionReader {
    fn default() -> Self {
        Self::combine([Self::query_string("api-version"), Self::url_segment()])
    }
}

/// The parts of a request a reader may consult
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    /// Raw query string (without `?`)
    pub query: Option<&'a str>,
    /// Request headers
    pub headers: &'a HeaderMap,
    /// Parameters captured by the matched route
    pub route_params: &'a HashMap<String, String>,
}

/// Result of version extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedVersion {
    /// The extracted version
    pub version: ApiVersion,
    /// Where the version came from
    pub source: VersionSource,
}

/// Source from which a version was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Query parameter
    QueryString,
    /// URL segment
    UrlSegment,
    /// HTTP header
    Header,
    /// Media-type parameter
    MediaType,
    /// Nothing given; the configured default was assumed
    Default,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QueryString => "query string",
            Self::UrlSegment => "URL segment",
            Self::Header => "header",
            Self::MediaType => "media type",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

/// Values of the remaining readers that name a version other than `chosen`
fn overruled<'a>(
    readers: impl Iterator<Item = &'a ApiVersionReader>,
    chosen: ApiVersion,
    req: &RequestView<'_>,
) -> Vec<(String, VersionSource)> {
    readers
        .filter_map(|reader| reader.read_raw(req))
        .filter(|(raw, _)| raw.parse::<ApiVersion>().ok() != Some(chosen))
        .collect()
}

/// Find the first value of `param` in a query string
fn query_value(query: &str, param: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    pairs
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(param))
        .map(|(_, value)| value.trim().to_string())
}

/// Find `param` among the media-type parameters of `Accept`, then
/// `Content-Type`
fn media_type_value(headers: &HeaderMap, param: &str) -> Option<String> {
    [header::ACCEPT, header::CONTENT_TYPE]
        .iter()
        .flat_map(|name| headers.get_all(name))
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|media_range| {
            media_range.split(';').skip(1).find_map(|parameter| {
                let (key, value) = parameter.split_once('=')?;
                if key.trim().eq_ignore_ascii_case(param) {
                    Some(value.trim().trim_matches('"').to_string())
                } else {
                    None
                }
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn view<'a>(
        query: Option<&'a str>,
        headers: &'a HeaderMap,
        params: &'a HashMap<String, String>,
    ) -> RequestView<'a> {
        RequestView {
            query,
            headers,
            route_params: params,
        }
    }

    #[test]
    fn test_read_from_query() {
        let reader = ApiVersionReader::query_string("version");
        let headers = HeaderMap::new();
        let params = HashMap::new();

        let read = reader
            .read(&view(Some("foo=bar&version=2.0"), &headers, &params))
            .unwrap();
        assert_eq!(
            read,
            Some(ExtractedVersion {
                version: ApiVersion::v2(),
                source: VersionSource::QueryString,
            })
        );

        let read = reader
            .read(&view(Some("Version=1%2E0"), &headers, &params))
            .unwrap();
        assert_eq!(read.map(|r| r.version), Some(ApiVersion::v1()));

        let read = reader
            .read(&view(Some("api-version=3"), &headers, &params))
            .unwrap();
        assert_eq!(read, None);
    }

    #[test]
    fn test_read_from_url_segment() {
        let reader = ApiVersionReader::url_segment();
        let headers = HeaderMap::new();
        let mut params = HashMap::new();
        params.insert("version".to_string(), "v1.0".to_string());

        let read = reader.read(&view(None, &headers, &params)).unwrap();
        assert_eq!(read.map(|r| r.version), Some(ApiVersion::v1()));
        assert_eq!(read.map(|r| r.source), Some(VersionSource::UrlSegment));
    }

    #[test]
    fn test_read_from_header() {
        let reader = ApiVersionReader::header("X-API-Version");
        let mut headers = HeaderMap::new();
        headers.insert("x-api-version", HeaderValue::from_static(" 2.0 "));
        let params = HashMap::new();

        let read = reader.read(&view(None, &headers, &params)).unwrap();
        assert_eq!(read.map(|r| r.version), Some(ApiVersion::v2()));
    }

    #[test]
    fn test_read_from_media_type() {
        let reader = ApiVersionReader::media_type("version");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html, application/json; charset=utf-8; version=\"2.0\""),
        );
        let params = HashMap::new();

        let read = reader.read(&view(None, &headers, &params)).unwrap();
        assert_eq!(read.map(|r| r.version), Some(ApiVersion::v2()));
        assert_eq!(read.map(|r| r.source), Some(VersionSource::MediaType));
    }

    #[test]
    fn test_media_type_falls_back_to_content_type() {
        let reader = ApiVersionReader::media_type("version");
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json;version=1.0"),
        );
        let params = HashMap::new();

        let read = reader.read(&view(None, &headers, &params)).unwrap();
        assert_eq!(read.map(|r| r.version), Some(ApiVersion::v1()));
    }

    #[test]
    fn test_combined_first_non_empty_wins() {
        let reader = ApiVersionReader::combine([
            ApiVersionReader::query_string("version"),
            ApiVersionReader::url_segment(),
            ApiVersionReader::header("X-API-Version"),
        ]);
        let mut headers = HeaderMap::new();
        headers.insert("x-api-version", HeaderValue::from_static("1.0"));
        let params = HashMap::new();

        // empty query value is treated as absent
        let read = reader
            .read(&view(Some("version="), &headers, &params))
            .unwrap();
        assert_eq!(read.map(|r| r.source), Some(VersionSource::Header));

        let read = reader
            .read(&view(Some("version=2.0"), &headers, &params))
            .unwrap();
        assert_eq!(read.map(|r| r.version), Some(ApiVersion::v2()));
    }

    #[test]
    fn test_overruled_values_are_reported() {
        let reader = ApiVersionReader::combine([
            ApiVersionReader::query_string("version"),
            ApiVersionReader::url_segment(),
            ApiVersionReader::header("X-API-Version"),
        ]);
        let mut headers = HeaderMap::new();
        headers.insert("x-api-version", HeaderValue::from_static("1"));
        let params = HashMap::from([("version".to_string(), "v2.0".to_string())]);
        let req = view(Some("version=1.0"), &headers, &params);

        let read = reader.read(&req).unwrap();
        assert_eq!(read.map(|r| r.version), Some(ApiVersion::v1()));

        // the header agrees with the query, only the segment is overruled
        let rest = reader.leaves().into_iter().skip(1);
        assert_eq!(
            overruled(rest, ApiVersion::v1(), &req),
            vec![("v2.0".to_string(), VersionSource::UrlSegment)]
        );
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let reader = ApiVersionReader::combine([
            ApiVersionReader::query_string("version"),
            ApiVersionReader::header("X-API-Version"),
        ]);
        let mut headers = HeaderMap::new();
        headers.insert("x-api-version", HeaderValue::from_static("1.0"));
        let params = HashMap::new();

        let err = reader
            .read(&view(Some("version=abc"), &headers, &params))
            .unwrap_err();
        assert_eq!(err.error_type(), "invalid_api_version");
    }

    #[test]
    fn test_reader_lookups() {
        let reader = ApiVersionReader::combine([
            ApiVersionReader::query_string("version"),
            ApiVersionReader::combine([ApiVersionReader::url_segment()]),
            ApiVersionReader::header("X-API-Version"),
            ApiVersionReader::media_type("version"),
        ]);

        assert_eq!(reader.leaves().len(), 4);
        assert_eq!(reader.query_param(), Some("version"));
        assert_eq!(reader.segment_param(), Some("version"));
        assert_eq!(reader.header_name(), Some("X-API-Version"));
    }
}
