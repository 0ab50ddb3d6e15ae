use restwire::http::header::canonicalize;
use restwire::http::{Method, ParamSource};
use restwire::Request;

use serde_json::json;

#[test]
fn header_names_are_canonical() {
    assert_eq!(canonicalize("Content-Type"), "content_type");

    let mut req = Request::new(Method::Get, "/");
    req.set_header("X-Forwarded-For", "a");
    req.add_header("x_forwarded_for", "b");

    assert_eq!(req.get_header("X-FORWARDED-FOR").as_deref(), Some("a, b"));
    assert_eq!(
        req.get_header_as_array("x-forwarded-for"),
        Some(&["a".to_owned(), "b".to_owned()][..])
    );

    req.remove_header("X-Forwarded-For");
    assert_eq!(req.get_header("x_forwarded_for"), None);
}

#[test]
fn parameter_precedence() {
    let mut req = Request::from_uri(Method::Post, "/widgets/7?id=query&sort=asc");
    req.set_url_params(json!({ "id": "url", "slug": "url" }).as_object().cloned().unwrap());
    req.set_default_params(json!({ "id": "default", "per_page": 10 }).as_object().cloned().unwrap());
    req.set_header("Content-Type", "application/json");
    req.set_body(r#"{"id":"json"}"#);

    assert_eq!(
        req.param_order(),
        [
            ParamSource::Json,
            ParamSource::Body,
            ParamSource::Query,
            ParamSource::Url,
            ParamSource::Defaults
        ]
    );
    assert_eq!(req.get_param("id"), Some(&json!("json")));
    assert_eq!(req.get_param("sort"), Some(&json!("asc")));
    assert_eq!(req.get_param("slug"), Some(&json!("url")));
    assert_eq!(req.get_param("per_page"), Some(&json!(10)));

    let params = req.get_params();
    assert_eq!(params["id"], "json");
    assert_eq!(params.len(), 4);
}

#[test]
fn get_requests_ignore_the_body() {
    let mut req = Request::from_uri(Method::Get, "/widgets?name=query");
    req.set_body("name=body");

    assert_eq!(
        req.param_order(),
        [ParamSource::Query, ParamSource::Url, ParamSource::Defaults]
    );
    assert_eq!(req.get_param("name"), Some(&json!("query")));
}

#[test]
fn replacing_the_body_resets_decoded_params() {
    let mut req = Request::new(Method::Put, "/widgets/7");
    req.set_header("Content-Type", "application/json");
    req.set_body(r#"{"name":"first"}"#);
    assert_eq!(req.get_param("name"), Some(&json!("first")));

    req.set_body(r#"{"name":"second"}"#);
    assert_eq!(req.get_param("name"), Some(&json!("second")));

    req.set_header("Content-Type", "application/x-www-form-urlencoded");
    req.set_body("name=third");
    assert_eq!(req.get_param("name"), Some(&json!("third")));
}
