use super::RouteTable;
use crate::endpoint::Endpoint;
use crate::{Request, Respond, RouteError};

/// Routes registered under a common namespace.
///
/// ```
/// use restwire::{Endpoint, Request, RouteTable, Scope};
/// use serde_json::json;
///
/// let scope = Scope::new("shop/v1")
///     .get("/widgets", |_: &Request| json!([]))
///     .route("/widgets/(?P<id>[0-9]+)", Endpoint::delete(|_: &Request| ()));
///
/// let mut routes = RouteTable::new();
/// routes.scope(scope)?;
///
/// assert!(routes.route("/shop/v1/widgets").is_some());
/// assert_eq!(routes.namespaces(), ["shop/v1"]);
/// # Ok::<(), restwire::RouteError>(())
/// ```
#[derive(Debug)]
pub struct Scope {
    namespace: String,
    routes: Vec<(String, Endpoint)>,
}

impl Scope {
    pub fn new(namespace: impl Into<String>) -> Self {
        Scope {
            namespace: namespace.into(),
            routes: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Add an endpoint under a route of this namespace.
    pub fn route(mut self, route: impl Into<String>, endpoint: Endpoint) -> Self {
        self.routes.push((route.into(), endpoint));
        self
    }

    pub(crate) fn register(self, table: &mut RouteTable) -> Result<(), RouteError> {
        for (route, endpoint) in self.routes {
            table.register_in(&self.namespace, &route, endpoint)?;
        }
        Ok(())
    }
}

macro_rules! route {
    ($name:ident) => {
        #[doc = concat!("Add a `", stringify!($name), "` endpoint under a route of this namespace.")]
        pub fn $name<F, R>(self, route: impl Into<String>, f: F) -> Self
        where
            F: Fn(&Request) -> R + Send + Sync + 'static,
            R: Respond,
        {
            self.route(route, Endpoint::$name(f))
        }
    };
}

impl Scope {
    route!(get);
    route!(post);
    route!(put);
    route!(patch);
    route!(delete);
}
