//! Extractors for apidoc
//!
//! Extractors parse data out of incoming requests before the handler runs.
//! A failing extractor short-circuits the handler with its error response.

use crate::error::{ApiError, Result};
use crate::request::Request;
use apidoc_openapi::versioning::{ApiVersion, ExtractedVersion, VersionSource};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::ops::Deref;

/// Trait for extracting data from request parts (headers, path, query)
///
/// This is used for extractors that don't need the request body.
pub trait FromRequestParts: Sized {
    /// Extract from request parts
    fn from_request_parts(req: &Request) -> Result<Self>;
}

/// Trait for extracting data from the full request (including body)
///
/// This is used for extractors that consume the request body.
pub trait FromRequest: Sized {
    /// Extract from the full request
    fn from_request(req: &mut Request) -> impl Future<Output = Result<Self>> + Send;
}

// Blanket impl: FromRequestParts -> FromRequest
impl<T: FromRequestParts> FromRequest for T {
    async fn from_request(req: &mut Request) -> Result<Self> {
        T::from_request_parts(req)
    }
}

/// JSON extractor and response
///
/// As an extractor it deserializes the request body. As a return value it
/// serializes `T` with `Content-Type: application/json`.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_users() -> Json<Vec<User>> {
///     Json(vec![User { id: 1, name: "John Doe".to_string() }])
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned + Send> FromRequest for Json<T> {
    async fn from_request(req: &mut Request) -> Result<Self> {
        let body = req
            .take_body()
            .ok_or_else(|| ApiError::internal("Body already consumed"))?;

        let value: T = serde_json::from_slice(&body)?;
        Ok(Json(value))
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Query string extractor
///
/// Parses the query string into type `T`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct Pagination {
///     page: Option<u32>,
///     limit: Option<u32>,
/// }
///
/// async fn list_users(Query(params): Query<Pagination>) -> impl IntoResponse {
///     // params.page, params.limit
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Query<T>(pub T);

impl<T: DeserializeOwned> FromRequestParts for Query<T> {
    fn from_request_parts(req: &Request) -> Result<Self> {
        let query = req.query_string().unwrap_or("");
        let value: T = serde_urlencoded::from_str(query)
            .map_err(|e| ApiError::bad_request(format!("Invalid query string: {}", e)))?;
        Ok(Query(value))
    }
}

impl<T> Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// State extractor
///
/// Extracts shared application state registered with `App::state`.
#[derive(Debug, Clone)]
pub struct State<T>(pub T);

impl<T: Clone + Send + Sync + 'static> FromRequestParts for State<T> {
    fn from_request_parts(req: &Request) -> Result<Self> {
        req.state().get::<T>().cloned().map(State).ok_or_else(|| {
            ApiError::internal(format!(
                "State of type `{}` not found. Did you forget to call .state()?",
                std::any::type_name::<T>()
            ))
        })
    }
}

impl<T> Deref for State<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Request headers extractor
#[derive(Debug, Clone)]
pub struct Headers(pub HeaderMap);

impl Headers {
    /// Get a header value as a string
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }
}

impl FromRequestParts for Headers {
    fn from_request_parts(req: &Request) -> Result<Self> {
        Ok(Headers(req.headers().clone()))
    }
}

impl Deref for Headers {
    type Target = HeaderMap;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The API version a versioned route resolved for this request
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(version: RequestedApiVersion) -> String {
///     format!("served by {}", version.version())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedApiVersion(pub ExtractedVersion);

impl RequestedApiVersion {
    /// The resolved version
    pub fn version(&self) -> ApiVersion {
        self.0.version
    }

    /// Where the version came from
    pub fn source(&self) -> VersionSource {
        self.0.source
    }
}

impl FromRequestParts for RequestedApiVersion {
    fn from_request_parts(req: &Request) -> Result<Self> {
        req.extensions()
            .get::<ExtractedVersion>()
            .copied()
            .map(RequestedApiVersion)
            .ok_or_else(|| ApiError::internal("RequestedApiVersion used outside a versioned route"))
    }
}

/// Optional extractor wrapper
///
/// Makes any extractor optional - returns None instead of error on failure.
impl<T: FromRequestParts> FromRequestParts for Option<T> {
    fn from_request_parts(req: &Request) -> Result<Self> {
        Ok(T::from_request_parts(req).ok())
    }
}
