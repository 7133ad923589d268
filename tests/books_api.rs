//! Integration tests for the book catalogue endpoints and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use common::{body_bytes, body_json, book_payload, create_book, delete, delete_json, get, post_json, put_json};
use library_ledger::config::LibraryConfig;
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// General routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn welcome_banner_is_served_at_root() {
    let app = common::build_test_app();
    let response = get(&app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.starts_with("Welcome to library management app"));
}

#[tokio::test]
async fn health_and_ready_report_ok() {
    let app = common::build_test_app();

    let response = get(&app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");

    let response = get(&app, "/api/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ready");
}

#[tokio::test]
async fn unknown_route_returns_not_found_envelope() {
    let app = common::build_test_app();
    let response = get(&app, "/api/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Not found");
    assert!(json["error"].is_null());
}

#[tokio::test]
async fn openapi_document_is_published() {
    let app = common::build_test_app();
    let response = get(&app, "/api-docs/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/books"].is_object());
    assert!(json["paths"]["/borrow"].is_object());
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_book_returns_created_book() {
    let app = common::build_test_app();
    let mut payload = book_payload("978-0-00-000001", 3);
    payload["title"] = json!("   The Lathe of Heaven   ");
    payload["available"] = json!(false);

    let response = post_json(&app, "/api/books", payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Book created successfully");

    let book = &json["data"];
    assert!(book["id"].is_string());
    assert_eq!(book["title"], "The Lathe of Heaven");
    assert_eq!(book["genre"], "FICTION");
    assert_eq!(book["copies"], 3);
    // Derived from copies, the client value is ignored
    assert_eq!(book["available"], true);
    assert!(book["createdAt"].is_string());
    assert!(book["updatedAt"].is_string());
}

#[tokio::test]
async fn create_book_reports_every_invalid_field() {
    let app = common::build_test_app();
    let payload = json!({
        "title": "Short",
        "author": "Abc",
        "genre": "fiction",
        "copies": -1
    });

    let response = post_json(&app, "/api/books", payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Validation failed");
    assert_eq!(json["error"]["name"], "ValidationFailed");

    let errors = &json["error"]["errors"];
    for field in ["title", "author", "genre", "isbn", "copies"] {
        assert!(errors[field].is_array(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn create_book_with_zero_copies_depends_on_policy() {
    let app = common::build_test_app();
    let response = post_json(&app, "/api/books", book_payload("zero-1", 0)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]["errors"]["copies"].is_array());

    let app = common::build_test_app_with(LibraryConfig {
        allow_zero_stock_creation: true,
        ..Default::default()
    });
    let book = create_book(&app, book_payload("zero-2", 0)).await;
    assert_eq!(book["copies"], 0);
    assert_eq!(book["available"], false);
}

#[tokio::test]
async fn duplicate_isbn_is_rejected_and_original_kept() {
    let app = common::build_test_app();
    let original = create_book(&app, book_payload("dup-isbn", 2)).await;

    let mut second = book_payload("dup-isbn", 9);
    second["title"] = json!("A Completely Different Title");
    let response = post_json(&app, "/api/books", second).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["name"], "DuplicateKey");
    assert_eq!(json["error"]["errors"]["isbn"], "dup-isbn");

    let id = original["id"].as_str().unwrap();
    let stored = body_json(get(&app, &format!("/api/books/{}", id)).await).await;
    assert_eq!(stored["data"], original);
}

#[tokio::test]
async fn malformed_json_body_is_a_validation_failure() {
    let app = common::build_test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/books")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["name"], "ValidationFailed");
    assert!(json["error"]["errors"]["body"].is_array());
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_book_by_id() {
    let app = common::build_test_app();
    let book = create_book(&app, book_payload("get-1", 1)).await;
    let id = book["id"].as_str().unwrap();

    let response = get(&app, &format!("/api/books/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Book retrieved successfully");
    assert_eq!(json["data"]["isbn"], "get-1");
}

#[tokio::test]
async fn get_unknown_or_malformed_id() {
    let app = common::build_test_app();

    let response = get(&app, &format!("/api/books/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Book not found");
    assert_eq!(json["error"]["name"], "NotFound");

    let response = get(&app, "/api/books/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]["errors"]["id"].is_array());
}

#[tokio::test]
async fn list_books_filters_sorts_and_limits() {
    let app = common::build_test_app();
    for (isbn, genre, copies) in [
        ("list-1", "FICTION", 5),
        ("list-2", "SCIENCE", 1),
        ("list-3", "FICTION", 2),
        ("list-4", "FICTION", 9),
    ] {
        let mut payload = book_payload(isbn, copies);
        payload["genre"] = json!(genre);
        create_book(&app, payload).await;
    }

    let response = get(&app, "/api/books?filter=FICTION&sortBy=copies&sort=asc&limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Books retrieved successfully");

    let copies: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["copies"].as_i64().unwrap())
        .collect();
    assert_eq!(copies, vec![2, 5]);

    let all = body_json(get(&app, "/api/books").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn list_books_rejects_unrecognized_query_values() {
    let app = common::build_test_app();

    let response = get(&app, "/api/books?sortBy=price&sort=sideways&filter=POETRY&limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let errors = body_json(response).await["error"]["errors"].clone();
    for field in ["sortBy", "sort", "filter", "limit"] {
        assert!(errors[field].is_array(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn list_books_default_limit_is_ten() {
    let app = common::build_test_app();
    for i in 0..12 {
        create_book(&app, book_payload(&format!("many-{}", i), 1)).await;
    }

    let json = body_json(get(&app, "/api/books").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 10);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_book_recomputes_availability() {
    let app = common::build_test_app();
    let book = create_book(&app, book_payload("upd-1", 2)).await;
    let uri = format!("/api/books/{}", book["id"].as_str().unwrap());

    let response = put_json(&app, &uri, json!({ "copies": 0, "available": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Book updated successfully");
    assert_eq!(json["data"]["copies"], 0);
    assert_eq!(json["data"]["available"], false);
    assert_eq!(json["data"]["title"], book["title"]);

    let json = body_json(put_json(&app, &uri, json!({ "copies": 4 })).await).await;
    assert_eq!(json["data"]["available"], true);
}

#[tokio::test]
async fn update_book_validation_and_missing() {
    let app = common::build_test_app();
    let book = create_book(&app, book_payload("upd-2", 2)).await;
    let uri = format!("/api/books/{}", book["id"].as_str().unwrap());

    let response = put_json(&app, &uri, json!({ "copies": -3, "genre": "POETRY" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = body_json(response).await["error"]["errors"].clone();
    assert!(errors["copies"].is_array());
    assert!(errors["genre"].is_array());

    let missing = format!("/api/books/{}", uuid::Uuid::new_v4());
    let response = put_json(&app, &missing, json!({ "copies": 1 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_to_taken_isbn_conflicts() {
    let app = common::build_test_app();
    create_book(&app, book_payload("taken", 1)).await;
    let other = create_book(&app, book_payload("free", 1)).await;
    let uri = format!("/api/books/{}", other["id"].as_str().unwrap());

    let response = put_json(&app, &uri, json!({ "isbn": "taken" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["name"], "DuplicateKey");
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_book_then_not_found() {
    let app = common::build_test_app();
    let book = create_book(&app, book_payload("del-1", 1)).await;
    let uri = format!("/api/books/{}", book["id"].as_str().unwrap());

    let response = delete(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Book deleted successfully");
    assert!(json["data"].is_null());

    let response = delete(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, &uri).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_delete_counts_removed_books() {
    let app = common::build_test_app();
    let a = create_book(&app, book_payload("bulk-1", 1)).await;
    let b = create_book(&app, book_payload("bulk-2", 1)).await;
    create_book(&app, book_payload("bulk-3", 1)).await;

    let body = json!({ "ids": [a["id"], b["id"], uuid::Uuid::new_v4().to_string()] });
    let response = delete_json(&app, "/api/books", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Books deleted successfully");
    assert_eq!(json["data"]["deletedCount"], 2);

    let remaining = body_json(get(&app, "/api/books").await).await;
    assert_eq!(remaining["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bulk_delete_requires_ids() {
    let app = common::build_test_app();

    for body in [json!({ "ids": [] }), json!({}), json!({ "ids": ["nope"] })] {
        let response = delete_json(&app, "/api/books", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"]["errors"]["ids"].is_array());
    }
}
