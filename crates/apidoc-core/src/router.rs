//! Router implementation using radix tree (matchit)
//!
//! # Path Patterns
//!
//! Routes support dynamic path parameters using `{param}` syntax:
//!
//! - `/api/users` - Static path
//! - `/api/{version}/users` - Single parameter capturing a whole segment
//!
//! # Example
//!
//! ```rust,ignore
//! use apidoc_core::{Router, get};
//!
//! async fn list_users() -> &'static str { "List users" }
//! async fn create_user() -> &'static str { "Create user" }
//!
//! let router = Router::new()
//!     .route("/users", get(list_users).post(create_user));
//! ```
//!
//! # Route Conflict Detection
//!
//! Conflicting routes are detected at registration time and panic with a
//! message naming both routes.

use crate::handler::{into_boxed_handler, BoxedHandler, Handler};
use apidoc_openapi::Operation;
use http::{Extensions, Method};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Information about a registered route for conflict detection
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// The original path pattern (e.g., "/api/{version}/users")
    pub path: String,
    /// The HTTP methods registered for this path
    pub methods: Vec<Method>,
}

/// Error raised when a route conflicts with an existing one
#[derive(Debug, Clone)]
pub struct RouteConflictError {
    /// The path that was being registered
    pub new_path: String,
    /// The existing path that conflicts
    pub existing_path: String,
    /// Detailed error message from the underlying router
    pub details: String,
}

impl fmt::Display for RouteConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ROUTE CONFLICT DETECTED")?;
        writeln!(f, "  Existing: {}", self.existing_path)?;
        writeln!(f, "  New:      {}", self.new_path)?;
        writeln!(f, "  Details:  {}", self.details)?;
        write!(
            f,
            "  Register every method and version of a path in one place, or use distinct path patterns"
        )
    }
}

impl std::error::Error for RouteConflictError {}

/// HTTP method router for a single path
///
/// Each method carries the OpenAPI [`Operation`] documenting it.
#[derive(Clone, Default)]
pub struct MethodRouter {
    handlers: HashMap<Method, BoxedHandler>,
    pub(crate) operations: HashMap<Method, Operation>,
    last: Option<Method>,
}

impl MethodRouter {
    /// Create a new empty method router
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler for a specific method
    pub fn on<H, T>(self, method: Method, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.on_boxed(method, into_boxed_handler(handler), Operation::new())
    }

    pub(crate) fn on_boxed(
        mut self,
        method: Method,
        handler: BoxedHandler,
        operation: Operation,
    ) -> Self {
        if self.handlers.contains_key(&method) {
            panic!(
                "Duplicate handler for method {} on the same path",
                method.as_str()
            );
        }

        self.handlers.insert(method.clone(), handler);
        self.operations.insert(method.clone(), operation);
        self.last = Some(method);
        self
    }

    /// Attach OpenAPI documentation to the most recently added method
    ///
    /// ```rust,ignore
    /// get(list_users).operation(Operation::new().operation_id("GetUsers"))
    /// ```
    pub fn operation(mut self, operation: Operation) -> Self {
        if let Some(method) = &self.last {
            self.operations.insert(method.clone(), operation);
        }
        self
    }

    /// Add a GET handler
    pub fn get<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::GET, handler)
    }

    /// Add a POST handler
    pub fn post<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::POST, handler)
    }

    /// Add a PUT handler
    pub fn put<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::PUT, handler)
    }

    /// Add a PATCH handler
    pub fn patch<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::PATCH, handler)
    }

    /// Add a DELETE handler
    pub fn delete<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::DELETE, handler)
    }

    /// Get handler for a method
    pub(crate) fn get_handler(&self, method: &Method) -> Option<&BoxedHandler> {
        self.handlers.get(method)
    }

    /// Registered methods, sorted by name
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Split into per-method handler and operation pairs
    pub(crate) fn into_parts(self) -> Vec<(Method, BoxedHandler, Operation)> {
        let mut operations = self.operations;
        self.handlers
            .into_iter()
            .map(|(method, handler)| {
                let operation = operations.remove(&method).unwrap_or_default();
                (method, handler, operation)
            })
            .collect()
    }
}

/// Create a GET route handler
pub fn get<H: Handler<T>, T: 'static>(handler: H) -> MethodRouter {
    MethodRouter::new().get(handler)
}

/// Create a POST route handler
pub fn post<H: Handler<T>, T: 'static>(handler: H) -> MethodRouter {
    MethodRouter::new().post(handler)
}

/// Create a PUT route handler
pub fn put<H: Handler<T>, T: 'static>(handler: H) -> MethodRouter {
    MethodRouter::new().put(handler)
}

/// Create a PATCH route handler
pub fn patch<H: Handler<T>, T: 'static>(handler: H) -> MethodRouter {
    MethodRouter::new().patch(handler)
}

/// Create a DELETE route handler
pub fn delete<H: Handler<T>, T: 'static>(handler: H) -> MethodRouter {
    MethodRouter::new().delete(handler)
}

/// Main router
pub struct Router {
    inner: MatchitRouter<MethodRouter>,
    state: Arc<Extensions>,
    registered_routes: HashMap<String, RouteInfo>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            inner: MatchitRouter::new(),
            state: Arc::new(Extensions::new()),
            registered_routes: HashMap::new(),
        }
    }

    /// Add a route
    ///
    /// # Panics
    ///
    /// Panics when the path conflicts with an already registered route.
    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        let matchit_path = convert_path_params(path);
        let methods = method_router.allowed_methods();

        if let Err(e) = self.inner.insert(matchit_path.clone(), method_router) {
            let existing_path = self
                .find_conflicting_route(&matchit_path)
                .map(|info| info.path.clone())
                .unwrap_or_else(|| "<unknown>".to_string());

            panic!(
                "{}",
                RouteConflictError {
                    new_path: path.to_string(),
                    existing_path,
                    details: e.to_string(),
                }
            );
        }

        self.registered_routes.insert(
            matchit_path,
            RouteInfo {
                path: path.to_string(),
                methods,
            },
        );
        self
    }

    fn find_conflicting_route(&self, matchit_path: &str) -> Option<&RouteInfo> {
        if let Some(info) = self.registered_routes.get(matchit_path) {
            return Some(info);
        }

        let normalized_new = normalize_path_for_comparison(matchit_path);
        self.registered_routes
            .iter()
            .find(|(registered, _)| normalize_path_for_comparison(registered) == normalized_new)
            .map(|(_, info)| info)
    }

    /// Add application state
    pub fn state<S: Clone + Send + Sync + 'static>(mut self, state: S) -> Self {
        Arc::make_mut(&mut self.state).insert(state);
        self
    }

    /// Match a request and return the handler + params
    pub(crate) fn match_route(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        match self.inner.at(path) {
            Ok(matched) => {
                let method_router = matched.value;

                if let Some(handler) = method_router.get_handler(method) {
                    let params: HashMap<String, String> = matched
                        .params
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect();

                    RouteMatch::Found { handler, params }
                } else {
                    RouteMatch::MethodNotAllowed {
                        allowed: method_router.allowed_methods(),
                    }
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }

    /// Get shared state
    pub(crate) fn state_ref(&self) -> Arc<Extensions> {
        self.state.clone()
    }

    /// Get registered routes (for testing and debugging)
    pub fn registered_routes(&self) -> &HashMap<String, RouteInfo> {
        &self.registered_routes
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of route matching
pub(crate) enum RouteMatch<'a> {
    Found {
        handler: &'a BoxedHandler,
        params: HashMap<String, String>,
    },
    NotFound,
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
}

/// Convert {param} style to :param for matchit
fn convert_path_params(path: &str) -> String {
    path.chars()
        .filter_map(|ch| match ch {
            '{' => Some(':'),
            '}' => None,
            _ => Some(ch),
        })
        .collect()
}

/// Replace parameter names with a placeholder for conflict comparison
fn normalize_path_for_comparison(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut in_param = false;

    for ch in path.chars() {
        match ch {
            ':' => {
                in_param = true;
                result.push_str(":_");
            }
            '/' => {
                in_param = false;
                result.push('/');
            }
            _ if in_param => {}
            _ => result.push(ch),
        }
    }

    result
}
