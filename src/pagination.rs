use crate::http::Request;
use crate::Response;

use serde_json::Value;

/// Pagination state of a collection response.
///
/// [`apply`](Pagination::apply) sets `X-WP-Total`, `X-WP-TotalPages`
/// and the `prev`/`next` entries of the `Link` header.
///
/// ```
/// use restwire::{Pagination, Request, Response};
/// use restwire::http::Method;
///
/// let req = Request::from_uri(Method::Get, "/widgets?per_page=10&page=6");
/// let mut response = Response::new(Vec::<u8>::new());
/// Pagination::new(51, 10, 6).apply(&mut response, &req);
///
/// assert_eq!(response.header("X-WP-TotalPages"), Some("6"));
/// assert_eq!(
///     response.header("Link"),
///     Some(r#"</widgets?per_page=10&page=5>; rel="prev""#),
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub per_page: u64,
    pub page: u64,
}

impl Pagination {
    pub fn new(total: u64, per_page: u64, page: u64) -> Self {
        Pagination {
            total,
            per_page,
            page,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }

        self.total / self.per_page + u64::from(self.total % self.per_page != 0)
    }

    /// The page linked as `rel="prev"`, if any.
    ///
    /// Pages past the end point back at the last page.
    pub fn prev(&self) -> Option<u64> {
        if self.page <= 1 {
            return None;
        }

        Some((self.page - 1).min(self.total_pages()).max(1))
    }

    /// The page linked as `rel="next"`, if any.
    pub fn next(&self) -> Option<u64> {
        if self.page < self.total_pages() {
            Some(self.page + 1)
        } else {
            None
        }
    }

    /// Set the pagination headers on `response`, linking to
    /// the request's URL with `page` rewritten.
    pub fn apply(&self, response: &mut Response, req: &Request) {
        response.set_header("X-WP-Total", self.total.to_string());
        response.set_header("X-WP-TotalPages", self.total_pages().to_string());

        if let Some(prev) = self.prev() {
            response.link_header("prev", &page_url(req, prev), &[]);
        }

        if let Some(next) = self.next() {
            response.link_header("next", &page_url(req, next), &[]);
        }
    }
}

impl Response {
    /// Apply pagination headers to this response.
    pub fn paginate(mut self, pagination: Pagination, req: &Request) -> Self {
        pagination.apply(&mut self, req);
        self
    }
}

/// The request URL with `page` rewritten.
///
/// The client's query string is kept in its original order when
/// available; otherwise it is rebuilt from the query parameters.
fn page_url(req: &Request, page: u64) -> String {
    let mut pairs = match req
        .query_string()
        .and_then(|query| serde_urlencoded::from_str::<Vec<(String, String)>>(query).ok())
    {
        Some(pairs) => pairs,
        None => query_pairs(req),
    };

    let page = page.to_string();
    let mut replaced = false;
    pairs.retain_mut(|(key, value)| {
        if key != "page" {
            return true;
        }
        if replaced {
            return false;
        }
        *value = page.clone();
        replaced = true;
        true
    });

    if !replaced {
        pairs.push(("page".to_owned(), page));
    }

    let query = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    format!("{}?{}", req.route(), query)
}

fn query_pairs(req: &Request) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (key, value) in req.query_params() {
        match value {
            Value::Array(values) => {
                let key = format!("{}[]", key);
                pairs.extend(values.iter().map(|value| (key.clone(), plain(value))));
            }
            value => pairs.push((key.clone(), plain(value))),
        }
    }

    pairs
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
