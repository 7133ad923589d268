//! Borrowing endpoints

use axum::{extract::State, http::StatusCode, Json};

use super::{ApiResponse, JsonBody};
use crate::{
    error::AppResult,
    models::borrow::CreateBorrowRequest,
    models::{Borrow, BorrowSummary},
    AppState,
};

/// Borrow copies of a book
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrow",
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Borrow recorded", body = Borrow),
        (status = 400, description = "Validation failed or not enough copies", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrow(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<ApiResponse<Borrow>>)> {
    let borrow = state.services.borrows.borrow(&body).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("Book borrowed successfully", borrow)))
}

/// Total borrowed quantity per book
#[utoipa::path(
    get,
    path = "/borrow",
    tag = "borrow",
    responses(
        (status = 200, description = "Borrowed books summary", body = Vec<BorrowSummary>)
    )
)]
pub async fn borrowed_summary(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<BorrowSummary>>>> {
    let summary = state.services.reports.borrowed_summary().await?;
    Ok(ApiResponse::ok("Borrowed books summary retrieved successfully", summary))
}
