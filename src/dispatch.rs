use crate::http::{Method, Methods, Response, StatusCode};
use crate::router::{Route, RouteTable};
use crate::{Config, Error, Reject, Request};

use serde_json::{json, Map, Value};

use std::sync::Arc;

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Dispatches requests to the endpoints of a route table.
///
/// The route table is shared immutably, so a dispatcher can be
/// cloned cheaply and used from many threads.
///
/// ```
/// use restwire::{Dispatcher, Endpoint, Request, RouteTable};
/// use restwire::http::{Method, StatusCode};
/// use serde_json::json;
///
/// let mut routes = RouteTable::new();
/// routes.register(
///     "/widgets/(?P<id>[0-9]+)",
///     Endpoint::get(|req: &Request| json!({ "id": req.get_param("id") })),
/// )?;
///
/// let dispatcher = Dispatcher::new(routes);
/// let response = dispatcher.dispatch(Request::new(Method::Get, "/widgets/42"));
///
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.data(), &json!({ "id": "42" }));
/// assert_eq!(response.header("Allow"), None);
/// # Ok::<(), restwire::RouteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    config: Config,
}

impl Dispatcher {
    pub fn new(routes: impl Into<Arc<RouteTable>>) -> Self {
        Dispatcher {
            routes: routes.into(),
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatch a request to the endpoint it addresses.
    ///
    /// Every failure is rendered as an error response, so this
    /// always produces a response.
    pub fn dispatch(&self, mut req: Request) -> Response {
        self.override_method(&mut req);

        let envelope = self.config.envelope_enabled() && req.query_params().contains_key("_envelope");

        let mut response = self.respond(&mut req);
        finalize(&mut response, req.method());

        tracing::debug!(
            method = %req.method(),
            route = %req.route(),
            status = response.status().as_u16(),
            "dispatched request"
        );

        if envelope {
            response = wrap_envelope(response);
        }

        response
    }

    fn override_method(&self, req: &mut Request) {
        if !self.config.method_override_enabled() || req.method() != Method::Post {
            return;
        }

        let requested = req.get_header("X-HTTP-Method-Override").or_else(|| {
            req.query_params()
                .get("_method")
                .and_then(Value::as_str)
                .map(str::to_owned)
        });

        if let Some(requested) = requested {
            match requested.parse::<Method>() {
                Ok(method) => {
                    tracing::debug!(%method, "overriding request method");
                    req.set_method(method);
                }
                Err(err) => tracing::debug!(error = %err, "ignoring method override"),
            }
        }
    }

    fn respond(&self, req: &mut Request) -> Response {
        let (route, url_params) = match self.routes.find(req.route()) {
            Some(matched) => matched,
            None => return self.unmatched(req),
        };

        tracing::trace!(pattern = %route.pattern(), "matched route");
        req.set_url_params(url_params);
        req.set_route_pattern(route.pattern());

        let grants = route
            .endpoints()
            .iter()
            .map(|endpoint| endpoint.allows(req))
            .collect::<Vec<_>>();

        let allowed = route
            .endpoints()
            .iter()
            .zip(&grants)
            .filter(|(_, grant)| matches!(grant, Ok(true)))
            .fold(Methods::NONE, |methods, (endpoint, _)| methods | endpoint.methods());

        let mut response = self.respond_to(route, req, &grants);

        let show_allow = !response.is_success()
            || req.method() == Method::Options
            || self.config.always_allow_enabled();

        if show_allow && !allowed.is_empty() {
            response.set_header("Allow", allowed.to_header());
        }

        response.set_matched_route(route.pattern());
        response
    }

    fn respond_to(&self, route: &Route, req: &mut Request, grants: &[Result<bool, Error>]) -> Response {
        let method = req.method();
        let candidates = route
            .endpoints()
            .iter()
            .zip(grants)
            .filter(|(endpoint, _)| endpoint.methods().contains(method))
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            if method == Method::Options {
                return Response::new(route.describe().unwrap_or(Value::Null));
            }

            tracing::debug!(%method, pattern = %route.pattern(), "no endpoint for method");
            return Error::no_route().reject();
        }

        let mut denial = None;
        let chosen = candidates.into_iter().find_map(|(endpoint, grant)| match grant {
            Ok(true) => Some(endpoint),
            Ok(false) => None,
            Err(err) => {
                denial.get_or_insert_with(|| err.clone());
                None
            }
        });

        let endpoint = match chosen {
            Some(endpoint) => endpoint,
            None => {
                let err = denial.unwrap_or_else(Error::forbidden);
                tracing::warn!(%method, route = %req.route(), code = %err.code(), "permission denied");
                return err.reject();
            }
        };

        req.set_attributes(endpoint.attributes());
        req.set_default_params_from_args();

        if let Err(err) = req.check_params() {
            tracing::warn!(route = %req.route(), code = %err.code(), "rejected request parameters");
            return err.reject();
        }

        match endpoint.call(req) {
            Ok(response) => response,
            Err(err) => {
                if err.status().is_server_error() {
                    tracing::error!(route = %req.route(), error = %err, "endpoint failed");
                }
                err.reject()
            }
        }
    }

    fn unmatched(&self, req: &Request) -> Response {
        if self.config.index_enabled() && Methods::READABLE.contains(req.method()) {
            let path = req.route().trim_matches('/');

            if path.is_empty() {
                return Response::new(self.routes.describe());
            }

            if let Some(index) = self.routes.describe_namespace(path) {
                return Response::new(index);
            }
        }

        tracing::debug!(method = %req.method(), route = %req.route(), "no route matched");
        Error::no_route().reject()
    }
}

fn finalize(response: &mut Response, method: Method) {
    if response.header("Content-Type").is_none() {
        response.set_header("Content-Type", JSON_CONTENT_TYPE);
    }

    if let Some(links) = response.links_value() {
        if let Value::Object(data) = response.data_mut() {
            data.entry("_links").or_insert(links);
        }
    }

    if method == Method::Head {
        response.set_data(Value::Null);
    }
}

fn wrap_envelope(response: Response) -> Response {
    let headers = response
        .headers()
        .map(|(name, value)| (name.to_owned(), Value::String(value.to_owned())))
        .collect::<Map<_, _>>();

    let mut envelope = Response::new(json!({
        "body": response.data(),
        "status": response.status().as_u16(),
        "headers": headers,
    }))
    .with_status(StatusCode::OK)
    .with_header("Content-Type", JSON_CONTENT_TYPE);

    if let Some(pattern) = response.matched_route() {
        envelope.set_matched_route(pattern);
    }

    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Endpoint;

    fn dispatcher(routes: RouteTable) -> Dispatcher {
        Dispatcher::new(routes)
    }

    #[test]
    fn method_override_only_applies_to_post() {
        let mut routes = RouteTable::new();
        routes
            .register("/widgets", Endpoint::delete(|_: &Request| "deleted"))
            .unwrap();
        let dispatcher = dispatcher(routes);

        let mut req = Request::new(Method::Post, "/widgets");
        req.set_header("X-HTTP-Method-Override", "DELETE");
        assert_eq!(dispatcher.dispatch(req).data(), &json!("deleted"));

        let req = Request::from_uri(Method::Post, "/widgets?_method=delete");
        assert_eq!(dispatcher.dispatch(req).data(), &json!("deleted"));

        let req = Request::from_uri(Method::Get, "/widgets?_method=DELETE");
        assert_eq!(dispatcher.dispatch(req).status(), StatusCode::NOT_FOUND);

        let disabled = dispatcher.with_config(Config::new().method_override(false));
        let req = Request::from_uri(Method::Post, "/widgets?_method=DELETE");
        assert_eq!(disabled.dispatch(req).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn links_merge_into_object_data() {
        let mut routes = RouteTable::new();
        routes
            .register(
                "/widgets/1",
                Endpoint::get(|_: &Request| {
                    let mut response = Response::new(json!({ "id": 1 }));
                    response.add_link("self", "/widgets/1", Map::new());
                    response
                }),
            )
            .unwrap();

        let response = dispatcher(routes).dispatch(Request::new(Method::Get, "/widgets/1"));
        assert_eq!(
            response.data(),
            &json!({ "id": 1, "_links": { "self": [{ "href": "/widgets/1" }] } })
        );
        assert_eq!(response.header("Content-Type"), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn handler_content_type_is_kept() {
        let mut routes = RouteTable::new();
        routes
            .register(
                "/feed",
                Endpoint::get(|_: &Request| Response::new("<rss/>").with_header("Content-Type", "application/rss+xml")),
            )
            .unwrap();

        let response = dispatcher(routes).dispatch(Request::new(Method::Get, "/feed"));
        assert_eq!(response.header("content-type"), Some("application/rss+xml"));
    }

    #[test]
    fn envelope() {
        let mut routes = RouteTable::new();
        routes.register("/widgets", Endpoint::get(|_: &Request| json!([1]))).unwrap();
        let dispatcher = dispatcher(routes);

        let response = dispatcher.dispatch(Request::from_uri(Method::Get, "/nope?_envelope"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.data()["status"], json!(404));
        assert_eq!(response.data()["body"]["code"], json!("rest_no_route"));

        let response = dispatcher.dispatch(Request::from_uri(Method::Get, "/widgets?_envelope=1"));
        assert_eq!(response.data()["body"], json!([1]));
        assert_eq!(response.data()["headers"]["Content-Type"], json!(JSON_CONTENT_TYPE));
        assert_eq!(response.matched_route(), Some("/widgets"));
    }

    #[test]
    fn index_only_for_unregistered_root() {
        let mut routes = RouteTable::new();
        routes.register_in("shop/v1", "/widgets", Endpoint::get(|_: &Request| ())).unwrap();
        let dispatcher = dispatcher(routes);

        let response = dispatcher.dispatch(Request::new(Method::Get, "/"));
        assert_eq!(response.data()["namespaces"], json!(["shop/v1"]));

        let response = dispatcher.dispatch(Request::new(Method::Get, "/shop/v1"));
        assert_eq!(response.data()["namespace"], json!("shop/v1"));

        let response = dispatcher.dispatch(Request::new(Method::Post, "/"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let disabled = dispatcher.with_config(Config::new().index(false));
        let response = disabled.dispatch(Request::new(Method::Get, "/"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
