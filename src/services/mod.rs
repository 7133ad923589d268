//! Business logic services

pub mod books;
pub mod borrows;
pub mod reports;

use crate::{config::LibraryConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub borrows: borrows::BorrowsService,
    pub reports: reports::ReportsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, library: LibraryConfig) -> Self {
        Self {
            books: books::BooksService::new(repository.clone(), library),
            borrows: borrows::BorrowsService::new(repository.clone()),
            reports: reports::ReportsService::new(repository.clone()),
            repository,
        }
    }

    /// Succeeds when the backing store answers
    pub async fn readiness(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }

    pub async fn shutdown(&self) {
        self.repository.close().await;
    }
}
