use crate::Error;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

use std::collections::BTreeMap;

/// A link to a related resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// An HTTP response produced by an endpoint or by the dispatcher.
///
/// ```
/// use restwire::Response;
/// use restwire::http::StatusCode;
/// use serde_json::json;
///
/// let response = Response::new(json!({ "id": 1 }))
///     .with_status(StatusCode::CREATED)
///     .with_header("Location", "/widgets/1");
///
/// assert_eq!(response.header("location"), Some("/widgets/1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    data: Value,
    links: BTreeMap<String, Vec<Link>>,
    matched_route: Option<String>,
}

impl Response {
    /// A `200 OK` response carrying `data`.
    pub fn new(data: impl Into<Value>) -> Self {
        Response {
            status: StatusCode::OK,
            headers: Vec::new(),
            data: data.into(),
            links: BTreeMap::new(),
            matched_route: None,
        }
    }

    /// A `201 Created` response with a `Location` header.
    pub fn created(data: impl Into<Value>, location: impl Into<String>) -> Self {
        Response::new(data)
            .with_status(StatusCode::CREATED)
            .with_header("Location", location)
    }

    /// A response rendering an error envelope.
    pub fn from_error(err: &Error) -> Self {
        Response::new(err.to_envelope()).with_status(err.status())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Replace a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name, value)),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Add a value to a header, joining it to any existing value with `", "`.
    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => self.headers.push((name, value)),
        }
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    pub fn set_data(&mut self, data: impl Into<Value>) {
        self.data = data.into();
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Register a link to a related resource.
    ///
    /// Links are rendered under `_links` when the response data
    /// is an object.
    pub fn add_link(&mut self, rel: impl Into<String>, href: impl Into<String>, attributes: Map<String, Value>) {
        self.links.entry(rel.into()).or_default().push(Link {
            href: href.into(),
            attributes,
        });
    }

    /// Remove links of a relation, or a single link when `href` is given.
    pub fn remove_link(&mut self, rel: &str, href: Option<&str>) {
        match href {
            Some(href) => {
                if let Some(links) = self.links.get_mut(rel) {
                    links.retain(|link| link.href != href);
                    if links.is_empty() {
                        self.links.remove(rel);
                    }
                }
            }
            None => {
                self.links.remove(rel);
            }
        }
    }

    pub fn links(&self) -> &BTreeMap<String, Vec<Link>> {
        &self.links
    }

    /// Append an entry to the `Link` header.
    ///
    /// ```
    /// use restwire::Response;
    ///
    /// let mut response = Response::new(());
    /// response.link_header("next", "/widgets?page=2", &[]);
    /// response.link_header("alternate", "/widgets.xml", &[("type", "text/xml")]);
    ///
    /// assert_eq!(
    ///     response.header("Link"),
    ///     Some(r#"</widgets?page=2>; rel="next", </widgets.xml>; rel="alternate"; type="text/xml""#),
    /// );
    /// ```
    pub fn link_header(&mut self, rel: &str, href: &str, attributes: &[(&str, &str)]) {
        let mut value = format!("<{}>; rel=\"{}\"", href, rel);
        for (key, attr) in attributes {
            value.push_str(&format!("; {}=\"{}\"", key, attr));
        }
        self.append_header("Link", value);
    }

    /// The pattern of the route that produced this response.
    pub fn matched_route(&self) -> Option<&str> {
        self.matched_route.as_deref()
    }

    pub(crate) fn set_matched_route(&mut self, pattern: impl Into<String>) {
        self.matched_route = Some(pattern.into());
    }

    /// Convert into a transport-level response with a serialized JSON body.
    ///
    /// Headers that are not valid HTTP header names or values are dropped.
    pub fn into_http(self) -> http::Response<Bytes> {
        let body = match serde_json::to_vec(&self.data) {
            Ok(body) => Bytes::from(body),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize response body");
                Bytes::new()
            }
        };

        let mut response = http::Response::new(body);
        *response.status_mut() = self.status;

        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().append(name, value);
                }
                _ => tracing::warn!(header = %name, "dropping invalid response header"),
            }
        }

        response
    }

    pub(crate) fn links_value(&self) -> Option<Value> {
        if self.links.is_empty() {
            return None;
        }

        serde_json::to_value(&self.links).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::new(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn headers_are_case_insensitive() {
        let mut response = Response::new(json!([]));
        response.set_header("X-WP-Total", "3");
        response.set_header("x-wp-total", "4");

        assert_eq!(response.header("X-WP-TOTAL"), Some("4"));
        assert_eq!(response.headers().count(), 1);

        response.remove_header("X-Wp-Total");
        assert_eq!(response.header("x-wp-total"), None);
    }

    #[test]
    fn append_joins_values() {
        let mut response = Response::default();
        response.append_header("Allow", "GET");
        response.append_header("allow", "POST");

        assert_eq!(response.header("Allow"), Some("GET, POST"));
    }

    #[test]
    fn link_registry() {
        let mut response = Response::new(json!({}));
        response.add_link("self", "/widgets/1", Map::new());
        response.add_link("collection", "/widgets", Map::new());
        let mut attrs = Map::new();
        attrs.insert("embeddable".to_owned(), json!(true));
        response.add_link("author", "/users/2", attrs);

        assert_eq!(
            response.links_value(),
            Some(json!({
                "author": [{ "href": "/users/2", "embeddable": true }],
                "collection": [{ "href": "/widgets" }],
                "self": [{ "href": "/widgets/1" }]
            }))
        );

        response.remove_link("author", Some("/users/2"));
        response.remove_link("collection", None);
        assert_eq!(response.links().len(), 1);
    }

    #[test]
    fn created_sets_location() {
        let response = Response::created(json!({ "id": 9 }), "/widgets/9");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.header("Location"), Some("/widgets/9"));
    }

    #[test]
    fn into_http() {
        let response = Response::new(json!({ "ok": true }))
            .with_status(StatusCode::ACCEPTED)
            .with_header("Content-Type", "application/json")
            .with_header("Bad Header", "x");

        let response = response.into_http();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers().len(), 1);
        assert_eq!(&response.body()[..], br#"{"ok":true}"#);
    }

    #[test]
    fn error_response() {
        let response = Response::from_error(&Error::forbidden());
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.data()["code"], json!("rest_forbidden"));
        assert_eq!(response.data()["data"]["status"], json!(403));
    }
}
