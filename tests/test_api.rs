//! End-to-end handler tests through the router, without sockets

use std::sync::Arc;

use bookstore::api::Router;
use bookstore::config::DatabaseConfig;
use bookstore::http::request::{Method, RequestBuilder};
use bookstore::http::response::{Response, StatusCode};
use bookstore::model::Book;
use bookstore::store::BookStore;
use serde_json::{json, Value};

const API_URL: &str = "http://localhost:5000/api/v1/books";

async fn router() -> Router {
    let store = BookStore::open_in_memory().await.unwrap();
    Router::new(Arc::new(store), API_URL)
}

async fn send(router: &Router, method: Method, path: &str, body: Option<Value>) -> Response {
    let mut builder = RequestBuilder::new().method(method).path(path);
    if let Some(body) = body {
        builder = builder.json(&body);
    }
    router.handle(&builder.build().unwrap()).await
}

async fn send_raw(router: &Router, method: Method, path: &str, body: &str) -> Response {
    let req = RequestBuilder::new()
        .method(method)
        .path(path)
        .body(body)
        .build()
        .unwrap();
    router.handle(&req).await
}

fn body_json(response: &Response) -> Value {
    serde_json::from_slice(&response.body).unwrap()
}

#[tokio::test]
async fn test_create_dune_scenario() {
    let router = router().await;

    let response = send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert", "published_year": 1965})),
    )
    .await;

    assert_eq!(response.status, StatusCode::Created);
    assert_eq!(
        body_json(&response),
        json!({"id": 1, "title": "Dune", "author": "Herbert", "published_year": 1965})
    );
    assert_eq!(response.header("Location"), Some("/api/v1/books/1"));
    assert_eq!(response.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn test_get_unknown_book_scenario() {
    let router = router().await;

    let response = send(&router, Method::GET, "/api/v1/books/999", None).await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(body_json(&response), json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_delete_then_get_scenario() {
    let router = router().await;
    send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;

    let deleted = send(&router, Method::DELETE, "/api/v1/books/1", None).await;
    assert_eq!(deleted.status, StatusCode::NoContent);
    assert!(deleted.body.is_empty());

    let fetched = send(&router, Method::GET, "/api/v1/books/1", None).await;
    assert_eq!(fetched.status, StatusCode::NotFound);

    let again = send(&router, Method::DELETE, "/api/v1/books/1", None).await;
    assert_eq!(again.status, StatusCode::NotFound);
    assert_eq!(body_json(&again), json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_list_starts_empty_then_grows() {
    let router = router().await;

    let empty = send(&router, Method::GET, "/api/v1/books", None).await;
    assert_eq!(empty.status, StatusCode::Ok);
    assert_eq!(body_json(&empty), json!([]));

    for title in ["Dune", "Hyperion", "Solaris"] {
        let created = send(
            &router,
            Method::POST,
            "/api/v1/books",
            Some(json!({"title": title, "author": "Someone"})),
        )
        .await;
        assert_eq!(created.status, StatusCode::Created);
    }

    let listed = send(&router, Method::GET, "/api/v1/books", None).await;
    let books: Vec<Book> = serde_json::from_slice(&listed.body).unwrap();
    assert_eq!(books.len(), 3);
    assert!(books.iter().all(|b| b.published_year.is_none()));
}

#[tokio::test]
async fn test_get_returns_created_fields() {
    let router = router().await;
    let created = send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Solaris", "author": "Lem", "published_year": 1961})),
    )
    .await;
    let created: Book = serde_json::from_slice(&created.body).unwrap();

    let fetched = send(
        &router,
        Method::GET,
        &format!("/api/v1/books/{}", created.id),
        None,
    )
    .await;

    assert_eq!(fetched.status, StatusCode::Ok);
    let fetched: Book = serde_json::from_slice(&fetched.body).unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_missing_fields_is_rejected_without_write() {
    let router = router().await;

    for body in [
        json!({"author": "Herbert"}),
        json!({"title": "Dune"}),
        json!({"title": "", "author": "Herbert"}),
        json!({"title": "Dune", "author": null}),
        json!({}),
    ] {
        let response = send(&router, Method::POST, "/api/v1/books", Some(body)).await;
        assert_eq!(response.status, StatusCode::BadRequest);
        assert_eq!(
            body_json(&response),
            json!({"error": "Title and author required"})
        );
    }

    assert_eq!(router.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let router = router().await;

    let response = send_raw(&router, Method::POST, "/api/v1/books", "{\"title\": ").await;
    assert_eq!(response.status, StatusCode::BadRequest);
    let error = body_json(&response)["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid JSON body"), "{error}");

    let wrong_type = send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert", "published_year": "1965"})),
    )
    .await;
    assert_eq!(wrong_type.status, StatusCode::BadRequest);

    let empty = send_raw(&router, Method::PUT, "/api/v1/books/1", "").await;
    assert_eq!(empty.status, StatusCode::BadRequest);

    assert_eq!(router.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let router = router().await;

    let response = send(&router, Method::GET, "/api/v1/books/abc", None).await;

    assert_eq!(response.status, StatusCode::BadRequest);
    assert_eq!(body_json(&response), json!({"error": "Invalid book id: abc"}));
}

#[tokio::test]
async fn test_update_preserves_omitted_and_clears_null() {
    let router = router().await;
    send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert", "published_year": 1965})),
    )
    .await;

    let renamed = send(
        &router,
        Method::PUT,
        "/api/v1/books/1",
        Some(json!({"title": "Dune Messiah"})),
    )
    .await;
    assert_eq!(renamed.status, StatusCode::Ok);
    assert_eq!(
        body_json(&renamed),
        json!({"id": 1, "title": "Dune Messiah", "author": "Herbert", "published_year": 1965})
    );

    let cleared = send(
        &router,
        Method::PUT,
        "/api/v1/books/1",
        Some(json!({"published_year": null})),
    )
    .await;
    assert_eq!(
        body_json(&cleared),
        json!({"id": 1, "title": "Dune Messiah", "author": "Herbert", "published_year": null})
    );
}

#[tokio::test]
async fn test_update_full_replacement() {
    let router = router().await;
    send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;

    let response = send(
        &router,
        Method::PUT,
        "/api/v1/books/1",
        Some(json!({"title": "Foundation", "author": "Asimov", "published_year": 1951})),
    )
    .await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(
        body_json(&response),
        json!({"id": 1, "title": "Foundation", "author": "Asimov", "published_year": 1951})
    );
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found_and_creates_nothing() {
    let router = router().await;

    let response = send(
        &router,
        Method::PUT,
        "/api/v1/books/7",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(body_json(&response), json!({"error": "Book not found"}));
    assert_eq!(router.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_with_blank_title_is_rejected() {
    let router = router().await;
    send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;

    let response = send(
        &router,
        Method::PUT,
        "/api/v1/books/1",
        Some(json!({"title": "  "})),
    )
    .await;

    assert_eq!(response.status, StatusCode::BadRequest);
    assert_eq!(
        body_json(&response),
        json!({"error": "Title and author cannot be empty"})
    );

    let unchanged = send(&router, Method::GET, "/api/v1/books/1", None).await;
    assert_eq!(body_json(&unchanged)["title"], "Dune");
}

#[tokio::test]
async fn test_health_endpoints() {
    let router = router().await;

    for path in ["/", "/health", "/api/v1"] {
        let response = send(&router, Method::GET, path, None).await;
        assert_eq!(response.status, StatusCode::Ok);

        let body = body_json(&response);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "Bookstore API");
        assert_eq!(body["apiURL"], API_URL);
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}

#[tokio::test]
async fn test_method_not_allowed_sets_allow_header() {
    let router = router().await;

    let response = send(&router, Method::DELETE, "/api/v1/books", None).await;

    assert_eq!(response.status, StatusCode::MethodNotAllowed);
    assert_eq!(response.header("Allow"), Some("GET, POST"));
    assert_eq!(body_json(&response), json!({"error": "Method not allowed"}));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let router = router().await;

    let response = send(&router, Method::GET, "/api/v1/authors", None).await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(body_json(&response), json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_non_object_bodies_are_bad_request() {
    let router = router().await;

    let positional = send_raw(
        &router,
        Method::POST,
        "/api/v1/books",
        r#"["Dune","Herbert",1965]"#,
    )
    .await;
    assert_eq!(positional.status, StatusCode::BadRequest);
    let error = body_json(&positional)["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid JSON body"), "{error}");
    assert_eq!(router.store().count().await.unwrap(), 0);

    send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;

    for body in ["[]", "\"Dune\"", "42", "null"] {
        let response = send_raw(&router, Method::PUT, "/api/v1/books/1", body).await;
        assert_eq!(response.status, StatusCode::BadRequest, "body {body}");
    }

    let unchanged = send(&router, Method::GET, "/api/v1/books/1", None).await;
    assert_eq!(body_json(&unchanged)["title"], "Dune");
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DatabaseConfig {
        path: dir.path().join("bookstore.db"),
        pool_size: 2,
    };
    let store = BookStore::open(&cfg).await.unwrap();
    let router = Router::new(Arc::new(store), API_URL);

    // Break the schema behind the store's back.
    let side = rusqlite::Connection::open(&cfg.path).unwrap();
    side.execute_batch("DROP TABLE books").unwrap();
    drop(side);

    let listed = send(&router, Method::GET, "/api/v1/books", None).await;
    assert_eq!(listed.status, StatusCode::InternalServerError);
    let error = body_json(&listed)["error"].as_str().unwrap().to_string();
    assert!(error.contains("no such table"), "{error}");

    let created = send(
        &router,
        Method::POST,
        "/api/v1/books",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::InternalServerError);
    assert_eq!(created.header("Content-Type"), Some("application/json"));
}
