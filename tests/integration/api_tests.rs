//! API integration tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshelf_server::{
    api, config::StoreBackend, repository::Repository, AppConfig, AppState,
};

const BASE_URL: &str = "/api/v1";

fn app() -> Router {
    let mut config = AppConfig::default();
    config.database.backend = StoreBackend::Memory;
    api::create_router(AppState::new(config, Repository::in_memory()))
}

/// Send a request and return the status with the parsed JSON body (Null if empty)
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_raw(app, method, uri, body.map(|b| b.to_string())).await
}

/// Like `send`, with the request body passed through verbatim
async fn send_raw(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(format!("{}{}", BASE_URL, uri));
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

fn book(title: &str, isbn: &str) -> Value {
    json!({
        "title": title,
        "author_first_name": "Frank",
        "author_last_name": "Herbert",
        "isbn": isbn,
        "category": "Sci-Fi",
        "type": "Paperback",
        "total_copies": 5,
        "copies_in_use": 2
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_create_get_and_delete_book() {
    let app = app();

    let (status, created) = send(&app, "POST", "/books", Some(book("Dune", "111"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("No book ID");
    assert_eq!(created["type"], "Paperback");

    let (status, fetched) = send(&app, "GET", &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = send(&app, "DELETE", &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "GET", &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchBook");

    let (status, _) = send(&app, "DELETE", &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_title_and_isbn() {
    let app = app();

    let (status, body) = send(&app, "POST", "/books", Some(book("", "111"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book title is required.");
    assert_eq!(body["code"], 18);

    let (status, body) = send(&app, "POST", "/books", Some(json!({ "title": "Dune" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book ISBN is required.");
}

#[tokio::test]
async fn test_dune_conflict_scenario() {
    let app = app();

    let (_, first) = send(&app, "POST", "/books", Some(book("Dune", "111"))).await;
    let first_id = first["id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", "/books", Some(book("Dune Messiah", "111"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");

    let (status, second) = send(&app, "POST", "/books", Some(book("Dune Messiah", "222"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = second["id"].as_i64().unwrap();

    let mut update = book("Dune", "222");
    update["id"] = json!(first_id);
    let (status, _) = send(&app, "PUT", &format!("/books/{}", first_id), Some(update)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut update = book("Dune Messiah", "333");
    update["id"] = json!(second_id);
    let (status, updated) = send(&app, "PUT", &format!("/books/{}", second_id), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isbn"], "333");

    let (_, fetched) = send(&app, "GET", &format!("/books/{}", second_id), None).await;
    assert_eq!(fetched["isbn"], "333");
}

#[tokio::test]
async fn test_update_id_mismatch() {
    let app = app();
    let (_, created) = send(&app, "POST", "/books", Some(book("Dune", "111"))).await;
    let id = created["id"].as_i64().unwrap();

    let mut update = book("Dune", "111");
    update["id"] = json!(id + 1);
    let (status, body) = send(&app, "PUT", &format!("/books/{}", id), Some(update)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "ID in URL does not match ID in request body.");
}

#[tokio::test]
async fn test_update_missing_book() {
    let app = app();
    let mut update = book("Dune", "111");
    update["id"] = json!(404);
    let (status, _) = send(&app, "PUT", "/books/404", Some(update)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_pagination() {
    let app = app();
    for i in 0..7 {
        let (status, _) = send(
            &app,
            "POST",
            "/books",
            Some(book(&format!("Dune {}", i), &format!("isbn-{}", i))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/books/search?search_by=title&search_value=DUNE&page=1&page_size=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["total"], 7);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 5);

    let (_, body) = send(
        &app,
        "GET",
        "/books/search?searchBy=title&searchValue=dune&page=2&pageSize=5",
        None,
    )
    .await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 7);

    let (status, body) = send(
        &app,
        "GET",
        "/books/search?search_by=title&search_value=dune&page=3&page_size=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 7);
}

#[tokio::test]
async fn test_search_parameter_validation() {
    let app = app();

    let (status, body) = send(&app, "GET", "/books/search?search_by=title&search_value=x&page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Page must be greater than zero.");

    let (status, body) = send(
        &app,
        "GET",
        "/books/search?search_by=title&search_value=x&page_size=51",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Page size must be between 1 and 50.");

    let (status, body) = send(&app, "GET", "/books/search?search_by=title", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid search parameters.");
}

#[tokio::test]
async fn test_malformed_requests_return_json_errors() {
    let app = app();

    let mut payload = book("Dune", "111");
    payload["total_copies"] = json!("many");
    let (status, body) = send(&app, "POST", "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 18);
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = send_raw(&app, "POST", "/books", Some("{\"title\": ".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = send(
        &app,
        "GET",
        "/books/search?search_by=title&search_value=dune&page=abc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 18);

    let (status, body) = send(&app, "GET", "/books/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = send(&app, "PUT", "/books/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_search_category_exact_and_unknown_field() {
    let app = app();
    for (i, category) in ["Fiction", "Non-Fiction", "Mystery"].iter().enumerate() {
        let mut body = book(&format!("Book {}", i), &format!("c-{}", i));
        body["category"] = json!(category);
        send(&app, "POST", "/books", Some(body)).await;
    }

    let (_, body) = send(
        &app,
        "GET",
        "/books/search?search_by=category&search_value=fiction",
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["category"], "Fiction");
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);

    let (_, body) = send(
        &app,
        "GET",
        "/books/search?search_by=publisher&search_value=anything",
        None,
    )
    .await;
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
