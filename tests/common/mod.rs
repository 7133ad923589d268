//! Shared helpers for the HTTP integration tests.
//!
//! The router is built exactly as in `main.rs`, backed by the in-memory
//! store, and driven in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use library_ledger::api;
use library_ledger::config::{AppConfig, DatabaseConfig, LibraryConfig, StorageBackend};
use library_ledger::repository::Repository;
use library_ledger::AppState;

/// Configuration with the in-memory backend and default library policy.
pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn build_test_app() -> Router {
    build_test_app_with(test_config().library)
}

pub fn build_test_app_with(library: LibraryConfig) -> Router {
    let config = AppConfig {
        library,
        ..test_config()
    };
    api::create_router(AppState::new(config, Repository::in_memory()))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

pub async fn delete_json(app: &Router, uri: &str, body: Value) -> Response {
    send(app, Method::DELETE, uri, Some(body)).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A valid creation payload; the title is derived from `isbn`.
pub fn book_payload(isbn: &str, copies: i64) -> Value {
    json!({
        "title": format!("Test Book {}", isbn),
        "author": "Test Author",
        "genre": "FICTION",
        "isbn": isbn,
        "description": "A book used by the tests",
        "copies": copies,
    })
}

/// Create a book through the API and return its `data` object.
pub async fn create_book(app: &Router, payload: Value) -> Value {
    let response = post_json(app, "/api/books", payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// RFC 3339 timestamp `days` from now.
pub fn due_in_days(days: i64) -> String {
    (chrono::Utc::now() + chrono::Duration::days(days)).to_rfc3339()
}

pub fn borrow_payload(book_id: &str, quantity: i64) -> Value {
    json!({
        "book": book_id,
        "quantity": quantity,
        "dueDate": due_in_days(14),
    })
}
