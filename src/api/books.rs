//! Book catalogue endpoints

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{ApiResponse, JsonBody};
use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::book::{BookListParams, CreateBookRequest, DeleteBooksRequest, DeleteBooksResponse, UpdateBookRequest},
    models::Book,
    AppState,
};

/// Catalogue a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already catalogued", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let book = state.services.books.create(&body).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("Book created successfully", book)))
}

/// List books with optional genre filter, sort and limit
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookListParams),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 400, description = "Unrecognized query value", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    params: Result<Query<BookListParams>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<Book>>>> {
    let Query(params) =
        params.map_err(|rejection| AppError::Validation(FieldErrors::single("query", rejection.body_text())))?;

    let books = state.services.books.list(&params).await?;
    Ok(ApiResponse::ok("Books retrieved successfully", books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Malformed book ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.books.get(&id).await?;
    Ok(ApiResponse::ok("Book retrieved successfully", book))
}

/// Update some fields of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already catalogued", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.books.update(&id, &body).await?;
    Ok(ApiResponse::ok("Book updated successfully", book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.books.delete(&id).await?;
    Ok(ApiResponse::ok("Book deleted successfully", ()))
}

/// Delete several books at once
#[utoipa::path(
    delete,
    path = "/books",
    tag = "books",
    request_body = DeleteBooksRequest,
    responses(
        (status = 200, description = "Number of books removed", body = DeleteBooksResponse),
        (status = 400, description = "Missing or malformed ids", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_books(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<ApiResponse<DeleteBooksResponse>>> {
    let deleted_count = state.services.books.delete_many(&body).await?;
    Ok(ApiResponse::ok(
        "Books deleted successfully",
        DeleteBooksResponse { deleted_count },
    ))
}
