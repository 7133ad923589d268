//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Ledger API",
        version = "1.0.0",
        description = "Book catalogue and borrowing ledger REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        health::health_check,
        health::readiness_check,
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::delete_book,
        books::delete_books,
        borrows::create_borrow,
        borrows::borrowed_summary,
    ),
    components(
        schemas(
            crate::models::Book,
            crate::models::Genre,
            crate::models::book::CreateBookRequest,
            crate::models::book::UpdateBookRequest,
            crate::models::book::DeleteBooksRequest,
            crate::models::book::DeleteBooksResponse,
            crate::models::Borrow,
            crate::models::borrow::CreateBorrowRequest,
            crate::models::BorrowSummary,
            crate::models::BorrowedBook,
            health::HealthResponse,
            crate::error::ErrorResponse,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalogue"),
        (name = "borrow", description = "Borrowing ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
