//! Request routing.
//!
//! The router maps an incoming method and path to the operation id of
//! a registered handler. The Almanac surface carries its variable parts
//! in the query string, so route patterns are plain literal segments
//! (`/api/book/all`); empty segments are filtered, which normalizes
//! trailing slashes.
//!
//! # Example
//!
//! ```rust
//! use almanac_server::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/api/book/all", "listBook");
//! router.add_route(Method::GET, "/api/book", "getBook");
//!
//! let m = router.match_route(&Method::GET, "/api/book/all").unwrap();
//! assert_eq!(m.operation_id(), "listBook");
//! ```

use http::Method;

/// A matched route.
///
/// Returned by [`Router::match_route`] when a route is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The operation id registered for the route
    operation_id: String,
}

impl RouteMatch {
    /// Creates a new route match.
    #[must_use]
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
        }
    }

    /// Returns the operation ID for this route.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }
}

/// A registered route.
#[derive(Debug, Clone)]
struct Route {
    /// HTTP method for this route
    method: Method,

    /// Path segments, empty segments filtered
    segments: Vec<String>,

    /// Operation id the route dispatches to
    operation_id: String,
}

impl Route {
    fn new(method: Method, pattern: &str, operation_id: impl Into<String>) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        Self {
            method,
            segments,
            operation_id: operation_id.into(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        path_segments.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(path_segments.iter())
                .all(|(expected, actual)| expected == actual)
    }
}

/// HTTP request router.
///
/// Routes are checked in registration order; first match wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    /// Registered routes
    routes: Vec<Route>,
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route to the router.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: impl AsRef<str>,
        operation_id: impl Into<String>,
    ) {
        self.routes
            .push(Route::new(method, pattern.as_ref(), operation_id));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Matches an incoming request to a route.
    ///
    /// Returns `None` if no registered route matches the method and
    /// path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.routes
            .iter()
            .find(|route| route.method == *method && route.matches(path))
            .map(|route| RouteMatch::new(&route.operation_id))
    }

    /// Checks if a specific operation id is registered.
    #[must_use]
    pub fn has_operation(&self, operation_id: &str) -> bool {
        self.routes.iter().any(|r| r.operation_id == operation_id)
    }
}
