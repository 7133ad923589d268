//! Catalogue management service

use serde_json::Value;

use crate::{
    config::LibraryConfig,
    error::AppResult,
    models::book::BookListParams,
    models::Book,
    repository::Repository,
    validation::{self, CreateRules},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    config: LibraryConfig,
}

impl BooksService {
    pub fn new(repository: Repository, config: LibraryConfig) -> Self {
        Self { repository, config }
    }

    /// Validate and catalogue a new book
    pub async fn create(&self, raw: &Value) -> AppResult<Book> {
        let new_book = validation::validate_new_book(raw, CreateRules::from(&self.config))?;
        let book = self.repository.books.create(&new_book).await?;
        tracing::info!(book_id = %book.id, isbn = %book.isbn, copies = book.copies, "Book created");
        Ok(book)
    }

    pub async fn get(&self, id: &str) -> AppResult<Book> {
        let id = validation::parse_id(id)?;
        self.repository.books.get(id).await
    }

    /// List books using the filter, sort and limit query parameters
    pub async fn list(&self, params: &BookListParams) -> AppResult<Vec<Book>> {
        let query = validation::validate_list_query(params, &self.config)?;
        tracing::debug!(?query, "Listing books");
        self.repository.books.list(&query).await
    }

    /// Apply a partial update; `available` follows the resulting copies
    pub async fn update(&self, id: &str, raw: &Value) -> AppResult<Book> {
        let id = validation::parse_id(id)?;
        let patch = validation::validate_book_patch(raw)?;
        let book = self.repository.books.update(id, &patch).await?;
        tracing::info!(book_id = %book.id, copies = book.copies, available = book.available, "Book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let id = validation::parse_id(id)?;
        let cascade = self.config.cascade_borrows_on_delete;
        self.repository.books.delete(id, cascade).await?;
        tracing::info!(book_id = %id, cascade, "Book deleted");
        Ok(())
    }

    /// Delete every listed book that exists and return how many were removed
    pub async fn delete_many(&self, raw: &Value) -> AppResult<u64> {
        let ids = validation::validate_bulk_delete(raw)?;
        let cascade = self.config.cascade_borrows_on_delete;
        let deleted = self.repository.books.delete_many(&ids, cascade).await?;
        tracing::info!(requested = ids.len(), deleted, cascade, "Books deleted");
        Ok(deleted)
    }
}
