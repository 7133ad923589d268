//! API handlers for the library ledger REST endpoints

pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, ErrorResponse, FieldErrors},
    AppState,
};

/// Success envelope wrapping every handler result
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

/// Raw JSON request body.
///
/// Payloads are validated field by field from the untyped value, so a body
/// that is not JSON at all is reported as a validation failure on `body`
/// instead of axum's plain-text rejection.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(FieldErrors::single("body", rejection.body_text())))?;
        Ok(JsonBody(value))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route(
            "/books",
            get(books::list_books)
                .post(books::create_book)
                .delete(books::delete_books),
        )
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/borrow", get(borrows::borrowed_summary).post(borrows::create_borrow))
        .with_state(state);

    Router::new()
        .route("/", get(welcome))
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn welcome() -> &'static str {
    "Welcome to library management app📚."
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            message: "Not found".to_string(),
            error: None,
        }),
    )
}
