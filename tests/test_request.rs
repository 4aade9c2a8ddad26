use bookstore::http::request::{Method, Request, RequestBuilder};
use std::collections::HashMap;

fn request_with_headers(version: &str, headers: &[(&str, &str)]) -> Request {
    Request {
        method: Method::GET,
        path: "/api/v1/books".to_string(),
        version: version.to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
        body: vec![],
    }
}

#[test]
fn test_request_header_lookup_ignores_case() {
    let req = request_with_headers(
        "HTTP/1.1",
        &[("Content-Type", "application/json"), ("host", "localhost")],
    );

    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Host"), Some("localhost"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_keep_alive_http11_default() {
    assert!(request_with_headers("HTTP/1.1", &[]).keep_alive());
}

#[test]
fn test_request_keep_alive_http10_default() {
    assert!(!request_with_headers("HTTP/1.0", &[]).keep_alive());
    assert!(request_with_headers("HTTP/1.0", &[("Connection", "keep-alive")]).keep_alive());
}

#[test]
fn test_request_keep_alive_close() {
    assert!(!request_with_headers("HTTP/1.1", &[("Connection", "close")]).keep_alive());
    assert!(!request_with_headers("HTTP/1.1", &[("connection", "Close")]).keep_alive());
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("DELETE"), Some(Method::DELETE));
    assert_eq!(Method::from_str("INVALID"), None);
    assert_eq!(Method::from_str("get"), None); // Case-sensitive
}

#[test]
fn test_method_display_round_trips() {
    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
        assert_eq!(Method::from_str(&method.to_string()), Some(method));
    }
}

#[test]
fn test_request_builder_defaults_version() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/api/v1/books")
        .json(&serde_json::json!({"title": "Dune", "author": "Herbert"}))
        .build()
        .unwrap();

    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(body["title"], "Dune");
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}
