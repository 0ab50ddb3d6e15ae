mod scope;
pub use scope::Scope;

use crate::endpoint::Endpoint;
use crate::http::{Method, Methods, Params};
use crate::RouteError;

use regex::{Regex, RegexBuilder};
use serde_json::{json, Map, Value};

/// A route pattern and the endpoints registered under it.
#[derive(Debug)]
pub struct Route {
    pattern: String,
    namespace: Option<String>,
    regex: Regex,
    endpoints: Vec<Endpoint>,
}

impl Route {
    fn new(pattern: String, namespace: Option<String>) -> Result<Self, RouteError> {
        let regex = RegexBuilder::new(&format!("^{}$", pattern))
            .case_insensitive(true)
            .build()
            .map_err(|source| RouteError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;

        Ok(Route {
            pattern,
            namespace,
            regex,
            endpoints: Vec::new(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Endpoints in registration order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Every method any endpoint of this route answers.
    pub fn methods(&self) -> Methods {
        self.endpoints
            .iter()
            .fold(Methods::NONE, |methods, endpoint| methods | endpoint.methods())
    }

    /// Match a request path, returning the named captures.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;

        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    let value = captures.name(name)?;
                    Some((name.to_owned(), Value::String(value.as_str().to_owned())))
                })
                .collect(),
        )
    }

    /// The discovery description of this route, or `None` when
    /// every endpoint is hidden.
    pub fn describe(&self) -> Option<Value> {
        let visible = self
            .endpoints
            .iter()
            .filter(|endpoint| !endpoint.is_hidden())
            .collect::<Vec<_>>();

        if visible.is_empty() {
            return None;
        }

        let methods = visible
            .iter()
            .fold(Methods::NONE, |methods, endpoint| methods | endpoint.methods());

        Some(json!({
            "namespace": self.namespace.as_deref().unwrap_or(""),
            "methods": methods.iter().map(Method::as_str).collect::<Vec<_>>(),
            "endpoints": visible.iter().map(|endpoint| endpoint.describe()).collect::<Vec<_>>(),
        }))
    }
}

/// An ordered table of routes.
///
/// Patterns are regular expressions matched against the whole
/// request path, case-insensitively. Named groups become URL
/// parameters. Lookups return the first route, in registration
/// order, whose pattern matches.
///
/// ```
/// use restwire::{Endpoint, Request, RouteTable};
///
/// let mut routes = RouteTable::new();
/// routes
///     .register("/widgets/(?P<id>[0-9]+)", Endpoint::get(|_: &Request| ()))?
///     .register("/widgets", Endpoint::post(|_: &Request| ()))?;
///
/// let (route, params) = routes.find("/widgets/42").unwrap();
/// assert_eq!(route.pattern(), "/widgets/(?P<id>[0-9]+)");
/// assert_eq!(params["id"], "42");
/// # Ok::<(), restwire::RouteError>(())
/// ```
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint under a route pattern.
    ///
    /// Endpoints registered under an existing pattern are appended
    /// to that route.
    pub fn register(
        &mut self,
        pattern: impl Into<String>,
        endpoint: Endpoint,
    ) -> Result<&mut Self, RouteError> {
        self.insert(None, pattern.into(), endpoint)?;
        Ok(self)
    }

    /// Register an endpoint under `/{namespace}/{route}`.
    pub fn register_in(
        &mut self,
        namespace: &str,
        route: &str,
        endpoint: Endpoint,
    ) -> Result<&mut Self, RouteError> {
        let namespace = namespace.trim_matches('/');
        let pattern = join(namespace, route);
        self.insert(Some(namespace.to_owned()), pattern, endpoint)?;
        Ok(self)
    }

    /// Register every route of a scope.
    pub fn scope(&mut self, scope: Scope) -> Result<&mut Self, RouteError> {
        scope.register(self)?;
        Ok(self)
    }

    fn insert(
        &mut self,
        namespace: Option<String>,
        pattern: String,
        endpoint: Endpoint,
    ) -> Result<(), RouteError> {
        if endpoint.methods().is_empty() {
            return Err(RouteError::NoMethods(pattern));
        }

        let index = match self.routes.iter().position(|route| route.pattern == pattern) {
            Some(index) => index,
            None => {
                self.routes.push(Route::new(pattern, namespace)?);
                self.routes.len() - 1
            }
        };

        tracing::trace!(
            pattern = %self.routes[index].pattern,
            methods = ?endpoint.methods(),
            "registered endpoint"
        );
        self.routes[index].endpoints.push(endpoint);
        Ok(())
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look up a route by its exact pattern.
    pub fn route(&self, pattern: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.pattern == pattern)
    }

    /// The first route matching `path`, with its URL parameters.
    pub fn find(&self, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.captures(path).map(|params| (route, params)))
    }

    /// Registered namespaces, in registration order.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces = Vec::new();
        for namespace in self.routes.iter().filter_map(Route::namespace) {
            if !namespaces.contains(&namespace) {
                namespaces.push(namespace);
            }
        }
        namespaces
    }

    /// The discovery index of every visible route.
    pub fn describe(&self) -> Value {
        json!({
            "namespaces": self.namespaces(),
            "routes": describe_routes(self.routes.iter()),
        })
    }

    /// The discovery index of a single namespace, if registered.
    pub fn describe_namespace(&self, namespace: &str) -> Option<Value> {
        let namespace = namespace.trim_matches('/');
        if !self.namespaces().contains(&namespace) {
            return None;
        }

        let routes = self
            .routes
            .iter()
            .filter(|route| route.namespace() == Some(namespace));

        Some(json!({
            "namespace": namespace,
            "routes": describe_routes(routes),
        }))
    }
}

fn describe_routes<'a>(routes: impl Iterator<Item = &'a Route>) -> Map<String, Value> {
    routes
        .filter_map(|route| Some((route.pattern.clone(), route.describe()?)))
        .collect()
}

fn join(namespace: &str, route: &str) -> String {
    let route = route.trim_start_matches('/');
    if route.is_empty() {
        format!("/{}", namespace)
    } else {
        format!("/{}/{}", namespace, route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Request;

    fn noop() -> Endpoint {
        Endpoint::get(|_: &Request| ())
    }

    #[test]
    fn first_registered_match_wins() {
        let mut routes = RouteTable::new();
        routes
            .register("/widgets/(?P<slug>[a-z0-9-]+)", noop())
            .unwrap()
            .register("/widgets/(?P<id>[0-9]+)", noop())
            .unwrap();

        let (route, params) = routes.find("/widgets/42").unwrap();
        assert_eq!(route.pattern(), "/widgets/(?P<slug>[a-z0-9-]+)");
        assert_eq!(params.get("slug"), Some(&json!("42")));
        assert!(params.get("id").is_none());
    }

    #[test]
    fn anchored_and_case_insensitive() {
        let mut routes = RouteTable::new();
        routes.register("/widgets", noop()).unwrap();

        assert!(routes.find("/WIDGETS").is_some());
        assert!(routes.find("/widgets/1").is_none());
        assert!(routes.find("/api/widgets").is_none());
    }

    #[test]
    fn same_pattern_appends_endpoints() {
        let mut routes = RouteTable::new();
        routes
            .register("/widgets", noop())
            .unwrap()
            .register("/widgets", Endpoint::post(|_: &Request| ()))
            .unwrap();

        assert_eq!(routes.routes().len(), 1);
        assert_eq!(routes.routes()[0].methods(), Methods::GET | Methods::POST);
    }

    #[test]
    fn invalid_patterns() {
        let mut routes = RouteTable::new();

        let err = routes.register("/widgets/(?P<id>[0-9+", noop()).unwrap_err();
        assert!(matches!(err, RouteError::Pattern { .. }));

        let err = routes
            .register("/widgets", Endpoint::new(Methods::NONE, |_: &Request| ()))
            .unwrap_err();
        assert!(matches!(err, RouteError::NoMethods(_)));
        assert!(routes.routes().is_empty());
    }

    #[test]
    fn namespaces() {
        let mut routes = RouteTable::new();
        routes
            .register_in("/shop/v1/", "/widgets", noop())
            .unwrap()
            .register_in("shop/v1", "", noop())
            .unwrap()
            .register_in("blog/v2", "posts", noop())
            .unwrap();

        assert_eq!(routes.namespaces(), ["shop/v1", "blog/v2"]);
        assert!(routes.route("/shop/v1/widgets").is_some());
        assert!(routes.route("/shop/v1").is_some());

        let index = routes.describe_namespace("shop/v1").unwrap();
        assert_eq!(index["routes"].as_object().map(Map::len), Some(2));
        assert!(routes.describe_namespace("nope").is_none());
    }

    #[test]
    fn hidden_endpoints_are_not_described() {
        let mut routes = RouteTable::new();
        routes
            .register("/internal", noop().hidden())
            .unwrap()
            .register("/widgets", noop())
            .unwrap()
            .register("/widgets", Endpoint::delete(|_: &Request| ()).hidden())
            .unwrap();

        let index = routes.describe();
        assert!(index["routes"].get("/internal").is_none());
        assert_eq!(index["routes"]["/widgets"]["methods"], json!(["GET"]));
        assert_eq!(index["routes"]["/widgets"]["endpoints"].as_array().map(Vec::len), Some(1));
    }
}
