mod body;
mod param;
mod validate;

pub use param::{ParamSource, Params};

use super::header::{canonicalize, ContentType, Headers};
use super::method::{InvalidMethod, Method, Methods};
use crate::args::Args;

use bytes::Bytes;
use once_cell::sync::OnceCell;

/// Route metadata attached to a request once an endpoint is chosen.
#[derive(Clone, Default, Debug)]
pub struct Attributes {
    /// The argument schema of the endpoint.
    pub args: Args,
    /// The methods the endpoint was registered for.
    pub methods: Methods,
    /// Whether the endpoint is hidden from discovery.
    pub hidden: bool,
}

/// An HTTP request, as seen by endpoint callbacks.
///
/// Parameters are kept in separate bags by source, and resolved
/// through [`get_param`](Request::get_param) in a fixed order of
/// precedence. See [`ParamSource`].
#[derive(Debug, Default)]
pub struct Request {
    method: Method,
    route: String,
    pattern: Option<String>,
    headers: Headers,
    raw_body: Bytes,
    attributes: Attributes,

    url: Params,
    query: Params,
    // as received, kept so links can preserve the client's ordering
    raw_query: Option<String>,
    body: Params,
    files: Params,
    defaults: Params,

    // decoded lazily from `raw_body`; reset whenever the body
    // or the content type changes
    json: OnceCell<Option<Params>>,
    form: OnceCell<Params>,
}

impl Request {
    /// Create a request for the given method and path.
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Request {
            method,
            route: route.into(),
            ..Default::default()
        }
    }

    /// Create a request from a path that may carry a query string.
    ///
    /// ```
    /// use restwire::{http::Method, Request};
    ///
    /// let req = Request::from_uri(Method::Get, "/widgets?page=2");
    /// assert_eq!(req.route(), "/widgets");
    /// assert_eq!(req.get_param("page").and_then(|v| v.as_str()), Some("2"));
    /// ```
    pub fn from_uri(method: Method, uri: &str) -> Self {
        match uri.split_once('?') {
            Some((route, query)) => {
                let mut req = Request::new(method, route);
                req.set_query_string(query);
                req
            }
            None => Request::new(method, uri),
        }
    }

    /// Build a request from a transport-level HTTP request.
    pub fn from_http(req: http::Request<Bytes>) -> Result<Self, InvalidMethod> {
        let (parts, body) = req.into_parts();

        let method = Method::from_http(&parts.method)
            .ok_or_else(|| InvalidMethod(parts.method.as_str().to_owned()))?;

        let mut req = Request::new(method, parts.uri.path());
        if let Some(query) = parts.uri.query() {
            req.set_query_string(query);
        }
        req.headers = Headers::from_http(&parts.headers);
        req.raw_body = body;

        Ok(req)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// The request path.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = route.into();
    }

    /// The pattern of the route this request was matched against.
    pub fn route_pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub(crate) fn set_route_pattern(&mut self, pattern: impl Into<String>) {
        self.pattern = Some(pattern.into());
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns every value of a header joined with `", "`.
    pub fn get_header(&self, name: &str) -> Option<String> {
        self.headers.get(name)
    }

    /// Returns the values of a header as a list.
    pub fn get_header_as_array(&self, name: &str) -> Option<&[String]> {
        self.headers.get_all(name)
    }

    /// Replace a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name, value);
        self.header_changed(name);
    }

    /// Append a value to a header.
    pub fn add_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.append(name, value);
        self.header_changed(name);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
        self.header_changed(name);
    }

    /// Replace all headers.
    pub fn set_headers<I, N, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        self.headers = Headers::new();
        for (name, value) in headers {
            self.headers.append(name.as_ref(), value);
        }
        self.reset_body_cache();
    }

    /// The parsed `Content-Type` header.
    pub fn content_type(&self) -> Option<ContentType> {
        self.headers
            .get("content-type")
            .and_then(|value| ContentType::parse(&value))
    }

    pub fn body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Replace the raw body.
    ///
    /// Body parameters set with [`set_body_params`](Request::set_body_params)
    /// are kept.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.raw_body = body.into();
        self.reset_body_cache();
    }

    fn header_changed(&mut self, name: &str) {
        if canonicalize(name) == "content_type" {
            self.reset_body_cache();
        }
    }

    fn reset_body_cache(&mut self) {
        self.json = OnceCell::new();
        self.form = OnceCell::new();
    }
}
