//! In-process store implementing both repositories
//!
//! Each book sits behind its own mutex so borrows of the same book are
//! serialized while different books proceed in parallel. The catalogue map
//! is only write-locked for inserts, deletes and isbn changes.
//!
//! Lock order: catalogue, then book, then ledger.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{BookRepository, BorrowRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookListQuery, BookPatch, Borrow, BorrowOutcome, BorrowSummary, BorrowedBook, NewBook, NewBorrow,
    },
};

#[derive(Default)]
struct Catalog {
    books: HashMap<Uuid, Arc<Mutex<Book>>>,
    /// isbn -> book id, the uniqueness index
    isbns: HashMap<String, Uuid>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    catalog: Arc<RwLock<Catalog>>,
    ledger: Arc<Mutex<Vec<Borrow>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: Uuid) -> Option<Arc<Mutex<Book>>> {
        self.catalog.read().await.books.get(&id).cloned()
    }

    /// Remove a book from the catalogue; the caller holds the write lock
    async fn remove(catalog: &mut Catalog, id: Uuid) -> bool {
        let Some(entry) = catalog.books.remove(&id) else {
            return false;
        };
        let isbn = entry.lock().await.isbn.clone();
        catalog.isbns.remove(&isbn);
        true
    }

    async fn purge_borrows(&self, ids: &[Uuid]) -> usize {
        let mut ledger = self.ledger.lock().await;
        let before = ledger.len();
        ledger.retain(|borrow| !ids.contains(&borrow.book));
        before - ledger.len()
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let mut catalog = self.catalog.write().await;
        if catalog.isbns.contains_key(&book.isbn) {
            return Err(AppError::DuplicateKey {
                field: "isbn".to_string(),
                value: book.isbn.clone(),
            });
        }

        let created = book.clone().into_book(Uuid::new_v4(), Utc::now());
        catalog.isbns.insert(created.isbn.clone(), created.id);
        catalog
            .books
            .insert(created.id, Arc::new(Mutex::new(created.clone())));
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Book> {
        let entry = self.entry(id).await.ok_or_else(AppError::book_not_found)?;
        let book = entry.lock().await.clone();
        Ok(book)
    }

    async fn list(&self, query: &BookListQuery) -> AppResult<Vec<Book>> {
        let entries: Vec<_> = self.catalog.read().await.books.values().cloned().collect();

        let mut books = Vec::with_capacity(entries.len());
        for entry in entries {
            let book = entry.lock().await.clone();
            if query.matches(&book) {
                books.push(book);
            }
        }

        books.sort_by(|a, b| query.compare(a, b));
        books.truncate(usize::try_from(query.limit).unwrap_or(0));
        Ok(books)
    }

    async fn update(&self, id: Uuid, patch: &BookPatch) -> AppResult<Book> {
        let mut catalog = self.catalog.write().await;
        let entry = catalog
            .books
            .get(&id)
            .cloned()
            .ok_or_else(AppError::book_not_found)?;
        let mut book = entry.lock().await;

        let mut merged = book.clone();
        merged.apply_patch(patch, Utc::now());

        if merged.isbn != book.isbn {
            if catalog.isbns.contains_key(&merged.isbn) {
                return Err(AppError::DuplicateKey {
                    field: "isbn".to_string(),
                    value: merged.isbn,
                });
            }
            catalog.isbns.remove(&book.isbn);
            catalog.isbns.insert(merged.isbn.clone(), id);
        }

        *book = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, id: Uuid, cascade_borrows: bool) -> AppResult<()> {
        let mut catalog = self.catalog.write().await;
        if !Self::remove(&mut catalog, id).await {
            return Err(AppError::book_not_found());
        }
        if cascade_borrows {
            let purged = self.purge_borrows(&[id]).await;
            tracing::debug!(book_id = %id, purged, "Removed borrow rows of deleted book");
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid], cascade_borrows: bool) -> AppResult<u64> {
        let mut catalog = self.catalog.write().await;
        let mut deleted = 0;
        for id in ids {
            if Self::remove(&mut catalog, *id).await {
                deleted += 1;
            }
        }
        if cascade_borrows {
            self.purge_borrows(ids).await;
        }
        Ok(deleted)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl BorrowRepository for MemoryStore {
    async fn commit_borrow(&self, borrow: &NewBorrow) -> AppResult<BorrowOutcome> {
        let Some(entry) = self.entry(borrow.book).await else {
            return Ok(BorrowOutcome::BookMissing);
        };

        // Held until the ledger row is written
        let mut book = entry.lock().await;
        let mut ledger = self.ledger.lock().await;

        // Reserve ledger space first so the append below cannot fail after the decrement
        ledger
            .try_reserve(1)
            .map_err(|e| AppError::Internal(format!("Borrow ledger is full: {}", e)))?;

        let now = Utc::now();
        match book.withdraw_copies(borrow.quantity, now) {
            Ok(()) => {}
            Err(AppError::InsufficientInventory { available, .. }) => {
                return Ok(BorrowOutcome::Insufficient { available });
            }
            Err(e) => return Err(e),
        }

        let record = borrow.clone().into_borrow(Uuid::new_v4(), now);
        ledger.push(record.clone());

        Ok(BorrowOutcome::Committed {
            borrow: record,
            remaining: book.copies,
        })
    }

    async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for borrow in self.ledger.lock().await.iter() {
            *totals.entry(borrow.book).or_default() += i64::from(borrow.quantity);
        }

        let mut summary = Vec::with_capacity(totals.len());
        for (book_id, total_quantity) in totals {
            // Rows whose book was deleted are left out
            let Some(entry) = self.entry(book_id).await else {
                continue;
            };
            let book = entry.lock().await;
            summary.push(BorrowSummary {
                book: BorrowedBook {
                    title: book.title.clone(),
                    isbn: book.isbn.clone(),
                },
                total_quantity,
            });
        }

        summary.sort_by(|a, b| {
            a.book
                .title
                .cmp(&b.book.title)
                .then_with(|| a.book.isbn.cmp(&b.book.isbn))
        });
        Ok(summary)
    }
}
