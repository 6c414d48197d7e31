//! Application builder

use crate::error::{ApiError, ServerError};
use crate::handler::BoxedHandler;
use crate::middleware::{LayerStack, MiddlewareLayer, DEFAULT_BODY_LIMIT};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::{MethodRouter, Router};
use crate::server::{Pipeline, Server};
use crate::versioned::VersionedRoutes;
use apidoc_openapi::versioning::{ApiVersion, ApiVersioningOptions, VersionedSpecBuilder};
use apidoc_openapi::{Annotations, ApiReferenceConfig, OpenApiSpec, Operation, Parameter};
use http::Method;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where documentation annotations are loaded from
#[derive(Debug, Clone)]
enum AnnotationSource {
    /// `<executable>.annotations.json` next to the running binary
    Default,
    Path(PathBuf),
    Disabled,
}

/// Main application builder
///
/// # Example
///
/// ```rust,ignore
/// use apidoc_rs::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), ServerError> {
///     App::new()
///         .api_versioning(ApiVersioningOptions::new().assume_default_version_when_unspecified(true))
///         .versioned_route("/api/users", ApiVersion::v1(), get(list_users))
///         .versioned_route("/api/users", ApiVersion::v2(), get(list_users_v2))
///         .api_reference(ApiReferenceConfig::new("Users API"))
///         .run("127.0.0.1:8080")
///         .await
/// }
/// ```
pub struct App {
    router: Router,
    layers: LayerStack,
    body_limit: Option<usize>,
    neutral: Vec<(String, Method, Operation)>,
    versioned: VersionedRoutes,
    versioning: ApiVersioningOptions,
    reference: Option<ApiReferenceConfig>,
    annotations: AnnotationSource,
    title: String,
    description: Option<String>,
}

impl App {
    /// Create a new application
    pub fn new() -> Self {
        // Initialize tracing if not already done
        let _ = tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,apidoc=debug")),
            )
            .with(tracing_subscriber::fmt::layer())
            .try_init();

        Self {
            router: Router::new(),
            layers: LayerStack::new(),
            body_limit: Some(DEFAULT_BODY_LIMIT),
            neutral: Vec::new(),
            versioned: VersionedRoutes::default(),
            versioning: ApiVersioningOptions::new(),
            reference: None,
            annotations: AnnotationSource::Default,
            title: "API".to_string(),
            description: None,
        }
    }

    /// Set the request body size limit
    ///
    /// ```rust,ignore
    /// App::new()
    ///     .body_limit(5 * 1024 * 1024)  // 5MB limit
    ///     .route("/upload", post(upload_handler))
    /// ```
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    /// Disable the body size limit
    ///
    /// Warning: This removes protection against large payloads.
    pub fn no_body_limit(mut self) -> Self {
        self.body_limit = None;
        self
    }

    /// Add a middleware layer to the application
    ///
    /// Layers are executed in the order they are added (outermost first).
    /// The first layer added will be the first to process the request and
    /// the last to process the response.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: MiddlewareLayer,
    {
        self.layers.push(Box::new(layer));
        self
    }

    /// Add application state
    ///
    /// State is shared across all handlers and can be extracted using `State<T>`.
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: Clone + Send + Sync + 'static,
    {
        self.router = self.router.state(state);
        self
    }

    /// Set the title and description of the generated OpenAPI documents
    pub fn openapi_info(mut self, title: &str, description: Option<&str>) -> Self {
        self.title = title.to_string();
        self.description = description.map(|d| d.to_string());
        self
    }

    /// Configure API versioning
    ///
    /// Applies to every route added with [`versioned_route`](Self::versioned_route).
    pub fn api_versioning(mut self, options: ApiVersioningOptions) -> Self {
        self.versioning = options;
        self
    }

    /// Serve the interactive API reference and the per-version documents
    pub fn api_reference(mut self, config: ApiReferenceConfig) -> Self {
        self.reference = Some(config);
        self
    }

    /// Load documentation annotations from an explicit file
    ///
    /// A missing file is ignored, as is the default location.
    pub fn annotations(mut self, path: impl Into<PathBuf>) -> Self {
        self.annotations = AnnotationSource::Path(path.into());
        self
    }

    /// Do not look for documentation annotations at all
    pub fn without_annotations(mut self) -> Self {
        self.annotations = AnnotationSource::Disabled;
        self
    }

    /// Add a version-neutral route
    ///
    /// ```rust,ignore
    /// App::new()
    ///     .route("/", get(index))
    ///     .route("/users", get(list_users).post(create_user))
    /// ```
    ///
    /// # Panics
    ///
    /// Panics when the path conflicts with an already registered route.
    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        for (method, op) in &method_router.operations {
            let mut op = op.clone();
            add_path_params_to_operation(path, None, &mut op);
            self.neutral.push((path.to_string(), method.clone(), op));
        }

        self.router = self.router.route(path, method_router);
        self
    }

    /// Map the handlers of `method_router` on `path` to one API version
    ///
    /// Call it once per version. The request is dispatched on the version
    /// the configured readers find, with the versioning options applied.
    ///
    /// ```rust,ignore
    /// App::new()
    ///     .versioned_route("/api/users", ApiVersion::v1(), get(list_users))
    ///     .versioned_route("/api/users", ApiVersion::v2(), get(list_users_v2))
    ///     .versioned_route("/api/{version}/users", ApiVersion::v1(), get(list_users))
    /// ```
    ///
    /// # Panics
    ///
    /// Panics when the same path, method and version is registered twice.
    pub fn versioned_route(
        mut self,
        path: &str,
        version: ApiVersion,
        method_router: MethodRouter,
    ) -> Self {
        self.versioned.insert(path, version, method_router);
        self
    }

    /// Build the OpenAPI document of every version group
    ///
    /// Keys are group names (`v1`, `v2`). With no versioned routes a single
    /// document for the default version holds the neutral routes.
    pub fn openapi_documents(&self) -> BTreeMap<String, OpenApiSpec> {
        let reader = self.versioning.reader.clone();
        let segment = reader.segment_param().map(str::to_string);

        let mut builder = VersionedSpecBuilder::new(self.title.clone()).reader(reader);
        if let Some(desc) = &self.description {
            builder = builder.description(desc.clone());
        }

        for mut entry in self.versioned.documented_operations() {
            for path in &entry.paths {
                add_path_params_to_operation(path, segment.as_deref(), &mut entry.operation);
            }
            builder = builder.operation(entry);
        }
        for (path, method, op) in &self.neutral {
            builder = builder.version_neutral(path, method.as_str(), op.clone());
        }

        let mut documents = builder.build();
        if documents.is_empty() {
            let version = self.versioning.default_version;
            let mut spec = OpenApiSpec::new(self.title.clone(), version.to_string());
            if let Some(desc) = &self.description {
                spec = spec.description(desc.clone());
            }
            for (path, method, op) in &self.neutral {
                spec.add_path(path, method.as_str(), op.clone());
            }
            documents.insert(version.group_name(), spec);
        }

        if let Some(annotations) = self.load_annotations() {
            for spec in documents.values_mut() {
                annotations.apply(spec);
            }
        }

        documents
    }

    fn load_annotations(&self) -> Option<Annotations> {
        let path = match &self.annotations {
            AnnotationSource::Default => Annotations::default_path()?,
            AnnotationSource::Path(path) => path.clone(),
            AnnotationSource::Disabled => return None,
        };
        Annotations::load_or_skip(&path)
    }

    /// Compile routes, version dispatch and documentation endpoints
    pub(crate) fn into_pipeline(self) -> Pipeline {
        let documents = match &self.reference {
            Some(_) => Some(self.openapi_documents()),
            None => None,
        };

        let App {
            mut router,
            layers,
            body_limit,
            versioned,
            versioning,
            reference,
            ..
        } = self;

        if !versioned.is_empty() {
            let options = Arc::new(versioning);
            for (path, method_router) in versioned.into_method_routers(options) {
                router = router.route(&path, method_router);
            }
        }

        if let (Some(config), Some(documents)) = (reference, documents) {
            router = mount_reference(router, config, documents);
        }

        Pipeline::new(router, layers, body_limit)
    }

    /// Run the server until the process is stopped
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// App::new()
    ///     .route("/", get(hello))
    ///     .run("127.0.0.1:8080")
    ///     .await
    /// ```
    pub async fn run(self, addr: &str) -> Result<(), ServerError> {
        self.run_with_shutdown(addr, std::future::pending()).await
    }

    /// Run the server until `signal` completes
    ///
    /// ```rust,ignore
    /// app.run_with_shutdown("127.0.0.1:8080", async {
    ///     let _ = tokio::signal::ctrl_c().await;
    /// })
    /// .await
    /// ```
    pub async fn run_with_shutdown<F>(self, addr: &str, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        Server::new(self.into_pipeline())
            .run_with_shutdown(addr, signal)
            .await
    }

    /// Get the compiled router (for testing or advanced usage)
    pub fn into_router(self) -> Router {
        self.into_pipeline().into_router()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Mount `/help` and the group documents
fn mount_reference(
    router: Router,
    config: ApiReferenceConfig,
    documents: BTreeMap<String, OpenApiSpec>,
) -> Router {
    let groups: Vec<String> = documents.keys().cloned().collect();
    let html = apidoc_openapi::api_reference_html(&config, &groups);
    let (parts, body) = html.into_parts();
    let page = Arc::new((parts, body));

    let page_handler: BoxedHandler = Arc::new(move |_req: Request| {
        let (parts, body) = page.as_ref();
        let mut response = Response::new(body.clone());
        *response.status_mut() = parts.status;
        *response.headers_mut() = parts.headers.clone();
        Box::pin(async move { response }) as Pin<Box<dyn Future<Output = Response> + Send>>
    });

    let mut router = router.route(
        &config.path,
        MethodRouter::new().on_boxed(Method::GET, page_handler, Operation::new()),
    );

    let Some((route, suffix)) = config.document_route() else {
        tracing::warn!(
            template = %config.document_path,
            "Document path must end with `{{documentName}}` in its last segment; documents are not served"
        );
        return router;
    };

    let documents = Arc::new(documents);
    let document_handler: BoxedHandler = Arc::new(move |req: Request| {
        let response = req
            .path_param("document")
            .and_then(|name| name.strip_suffix(suffix.as_str()))
            .and_then(|group| documents.get(group))
            .map(apidoc_openapi::openapi_json)
            .unwrap_or_else(|| {
                ApiError::not_found(format!("No API document at {}", req.path())).into_response()
            });
        Box::pin(async move { response }) as Pin<Box<dyn Future<Output = Response> + Send>>
    });

    router = router.route(
        &route,
        MethodRouter::new().on_boxed(Method::GET, document_handler, Operation::new()),
    );

    tracing::debug!(
        path = %config.path,
        documents = ?groups,
        "Mounted API reference"
    );
    router
}

/// Document `{param}` placeholders of `path` as required path parameters
///
/// `skip` names the version segment, which group documents substitute.
fn add_path_params_to_operation(path: &str, skip: Option<&str>, op: &mut Operation) {
    let mut params: Vec<String> = Vec::new();
    let mut in_brace = false;
    let mut current = String::new();

    for ch in path.chars() {
        match ch {
            '{' => {
                in_brace = true;
                current.clear();
            }
            '}' => {
                if in_brace {
                    in_brace = false;
                    if !current.is_empty() && Some(current.as_str()) != skip {
                        params.push(current.clone());
                    }
                }
            }
            _ => {
                if in_brace {
                    current.push(ch);
                }
            }
        }
    }

    for name in params {
        *op = std::mem::take(op).parameter(Parameter::string(name, "path", true, None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FromRequestParts, State};
    use crate::router::get;
    use bytes::Bytes;
    use std::collections::HashMap;

    async fn handler() -> &'static str {
        "ok"
    }

    #[test]
    fn state_is_available_via_extractor() {
        let app = App::new().state(123u32);
        let router = app.into_router();

        let req = http::Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();

        let request = Request::new(parts, Bytes::new(), router.state_ref(), HashMap::new());
        let State(value) = State::<u32>::from_request_parts(&request).unwrap();
        assert_eq!(value, 123u32);
    }

    #[test]
    fn test_path_params_documented_except_version_segment() {
        let mut op = Operation::new();
        add_path_params_to_operation("/api/{version}/users/{id}", Some("version"), &mut op);

        let params = op.parameters.unwrap();
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id"]);
        assert_eq!(params[0].location, "path");
        assert!(params[0].required);
    }

    #[test]
    fn test_documents_without_versioned_routes() {
        let docs = App::new()
            .without_annotations()
            .openapi_info("Plain", None)
            .route(
                "/users/{id}",
                get(handler).operation(Operation::new().operation_id("GetUser")),
            )
            .openapi_documents();

        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["v1"]);
        let json = docs["v1"].to_json();
        assert_eq!(json["info"]["title"], "Plain");
        assert_eq!(json["paths"]["/users/{id}"]["get"]["operationId"], "GetUser");
    }

    #[test]
    fn test_documents_one_per_version() {
        let docs = App::new()
            .without_annotations()
            .versioned_route("/api/users", ApiVersion::v1(), get(handler))
            .versioned_route("/api/users", ApiVersion::v2(), get(handler))
            .route("/health", get(handler))
            .openapi_documents();

        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["v1", "v2"]);
        for spec in docs.values() {
            assert!(spec.paths.contains_key("/health"));
            assert!(spec.paths.contains_key("/api/users"));
        }
    }
}
