//! Repository layer for persistence
//!
//! Services only see the `BookRepository` and `BorrowRepository` traits. Two
//! backends implement them: PostgreSQL (`books`, `borrows`) and an in-process
//! store (`memory`) used for development and tests.

pub mod books;
pub mod borrows;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookListQuery, BookPatch, BorrowOutcome, BorrowSummary, NewBook, NewBorrow},
};

/// Book records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book; `DuplicateKey` when the isbn is taken
    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    async fn get(&self, id: Uuid) -> AppResult<Book>;

    async fn list(&self, query: &BookListQuery) -> AppResult<Vec<Book>>;

    /// Merge `patch` into the stored book, serialized against concurrent borrows
    async fn update(&self, id: Uuid, patch: &BookPatch) -> AppResult<Book>;

    /// Remove one book; `NotFound` when absent
    async fn delete(&self, id: Uuid, cascade_borrows: bool) -> AppResult<()>;

    /// Remove every listed book that exists and return how many were removed
    async fn delete_many(&self, ids: &[Uuid], cascade_borrows: bool) -> AppResult<u64>;

    /// Check that the store answers
    async fn ping(&self) -> AppResult<()>;
}

/// Borrow ledger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowRepository: Send + Sync {
    /// Decrement the book's copies by the borrowed quantity only if enough are
    /// left, and append the ledger row, as one all-or-nothing unit.
    async fn commit_borrow(&self, borrow: &NewBorrow) -> AppResult<BorrowOutcome>;

    /// Borrowed quantity per existing book
    async fn summary(&self) -> AppResult<Vec<BorrowSummary>>;
}

/// Main repository struct holding the persistence backends
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookRepository>,
    pub borrows: Arc<dyn BorrowRepository>,
    pool: Option<Pool<Postgres>>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBookRepository::new(pool.clone())),
            borrows: Arc::new(borrows::PgBorrowRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository backed by process memory
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::new();
        Self {
            books: Arc::new(store.clone()),
            borrows: Arc::new(store),
            pool: None,
        }
    }

    /// Assemble a repository from arbitrary backends
    pub fn from_parts(books: Arc<dyn BookRepository>, borrows: Arc<dyn BorrowRepository>) -> Self {
        Self {
            books,
            borrows,
            pool: None,
        }
    }

    /// Release the database connections, if any
    pub async fn close(&self) {
        if let Some(ref pool) = self.pool {
            pool.close().await;
        }
    }
}

/// Translate a unique-constraint violation into `DuplicateKey`
pub(crate) fn map_unique_violation(error: sqlx::Error, field: &str, value: &str) -> AppError {
    match error {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::DuplicateKey {
            field: field.to_string(),
            value: value.to_string(),
        },
        other => AppError::Database(other),
    }
}
