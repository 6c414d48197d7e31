//! Version dispatch for routes mapped to several API versions
//!
//! Every `(path, method, version)` registration lands in a
//! [`VersionedRoutes`] table. When the app is built, each path collapses into
//! one [`MethodRouter`] whose handlers resolve the requested version and call
//! the handler mapped to it.

use crate::error::ApiError;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::MethodRouter;
use apidoc_openapi::versioning::{
    ApiVersion, ApiVersionSet, ApiVersioningOptions, VersionError, VersionedOperation,
};
use http::{HeaderName, HeaderValue, Method};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Handlers of one method, keyed by version
#[derive(Clone, Default)]
struct VersionedMethod {
    handlers: BTreeMap<ApiVersion, BoxedHandler>,
    operations: BTreeMap<ApiVersion, apidoc_openapi::Operation>,
}

/// All versions registered on one path
#[derive(Clone, Default)]
struct VersionedPath {
    methods: HashMap<Method, VersionedMethod>,
    versions: ApiVersionSet,
}

/// Registration table of versioned routes
#[derive(Clone, Default)]
pub(crate) struct VersionedRoutes {
    paths: BTreeMap<String, VersionedPath>,
}

impl VersionedRoutes {
    /// Map every method of `method_router` on `path` to `version`
    ///
    /// A version counts as deprecated on the path when its operation is
    /// marked deprecated.
    ///
    /// # Panics
    ///
    /// Panics when the same `(path, method, version)` is registered twice.
    pub(crate) fn insert(&mut self, path: &str, version: ApiVersion, method_router: MethodRouter) {
        let entry = self.paths.entry(path.to_string()).or_default();

        for (method, handler, operation) in method_router.into_parts() {
            entry.versions.insert(version, operation.deprecated);

            let slot = entry.methods.entry(method.clone()).or_default();
            if slot.handlers.insert(version, handler).is_some() {
                panic!(
                    "Duplicate handler for {} {} version {}",
                    method.as_str(),
                    path,
                    version
                );
            }
            slot.operations.insert(version, operation);
        }
    }

    /// Whether nothing has been registered
    pub(crate) fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Documentation entries for the per-version OpenAPI documents
    pub(crate) fn documented_operations(&self) -> Vec<VersionedOperation> {
        let mut out = Vec::new();
        for (path, entry) in &self.paths {
            let mut methods: Vec<_> = entry.methods.iter().collect();
            methods.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

            for (method, slot) in methods {
                for (version, operation) in &slot.operations {
                    out.push(VersionedOperation {
                        paths: vec![path.clone()],
                        method: method.as_str().to_string(),
                        version: *version,
                        deprecated: entry.versions.is_deprecated(version),
                        operation: operation.clone(),
                    });
                }
            }
        }
        out
    }

    /// Build one dispatching method router per path
    pub(crate) fn into_method_routers(
        self,
        options: Arc<ApiVersioningOptions>,
    ) -> Vec<(String, MethodRouter)> {
        self.paths
            .into_iter()
            .map(|(path, entry)| {
                let report: Arc<Vec<(HeaderName, HeaderValue)>> =
                    Arc::new(if options.report_api_versions {
                        entry.versions.report_headers()
                    } else {
                        Vec::new()
                    });

                let mut router = MethodRouter::new();
                for (method, slot) in entry.methods {
                    let dispatcher = version_dispatcher(
                        options.clone(),
                        Arc::new(slot.handlers),
                        report.clone(),
                    );
                    router = router.on_boxed(method, dispatcher, apidoc_openapi::Operation::new());
                }
                (path, router)
            })
            .collect()
    }
}

/// A handler that resolves the API version and calls the mapped handler
fn version_dispatcher(
    options: Arc<ApiVersioningOptions>,
    handlers: Arc<BTreeMap<ApiVersion, BoxedHandler>>,
    report: Arc<Vec<(HeaderName, HeaderValue)>>,
) -> BoxedHandler {
    Arc::new(move |mut req: Request| {
        let report = report.clone();

        // A segment that is not a version does not match a versioned template
        if let Some(segment) = options
            .reader
            .segment_param()
            .and_then(|param| req.path_param(param))
            .filter(|raw| raw.parse::<ApiVersion>().is_err())
        {
            tracing::debug!(path = %req.path(), segment = %segment, "URL segment is not an API version");
            let response =
                ApiError::not_found(format!("No route found for {} {}", req.method(), req.path()))
                    .into_response();
            return Box::pin(async move { response })
                as Pin<Box<dyn Future<Output = Response> + Send>>;
        }

        let resolved = options
            .requested_version(&req.version_view())
            .and_then(|extracted| match handlers.get(&extracted.version) {
                Some(handler) => Ok((extracted, handler.clone())),
                None => Err(VersionError::Unsupported {
                    requested: extracted.version,
                    supported: handlers.keys().copied().collect(),
                }),
            });

        match resolved {
            Ok((extracted, handler)) => {
                tracing::trace!(
                    version = %extracted.version,
                    source = %extracted.source,
                    "Resolved API version"
                );
                req.extensions_mut().insert(extracted);
                let fut = handler(req);
                Box::pin(async move { with_report_headers(fut.await, &report) })
                    as Pin<Box<dyn Future<Output = Response> + Send>>
            }
            Err(err) => {
                tracing::debug!(
                    path = %req.path(),
                    error_type = err.error_type(),
                    error = %err,
                    "API version resolution failed"
                );
                let response = ApiError::from(err).into_response();
                Box::pin(async move { with_report_headers(response, &report) })
                    as Pin<Box<dyn Future<Output = Response> + Send>>
            }
        }
    })
}

fn with_report_headers(mut response: Response, report: &[(HeaderName, HeaderValue)]) -> Response {
    for (name, value) in report {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}
