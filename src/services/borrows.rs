//! Borrow transaction service

use chrono::Utc;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{Borrow, BorrowOutcome, NewBorrow},
    repository::Repository,
    validation,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate a borrow request and commit it
    pub async fn borrow(&self, raw: &Value) -> AppResult<Borrow> {
        let request = validation::validate_new_borrow(raw, Utc::now())?;
        self.commit(request).await
    }

    /// Reserve the copies and record the borrow as one unit.
    ///
    /// The losing side of a race for the last copies gets
    /// `InsufficientInventory`; nothing is retried.
    pub async fn commit(&self, request: NewBorrow) -> AppResult<Borrow> {
        match self.repository.borrows.commit_borrow(&request).await? {
            BorrowOutcome::Committed { borrow, remaining } => {
                tracing::info!(
                    borrow_id = %borrow.id,
                    book_id = %borrow.book,
                    quantity = borrow.quantity,
                    remaining,
                    "Borrow committed"
                );
                Ok(borrow)
            }
            BorrowOutcome::BookMissing => {
                tracing::debug!(book_id = %request.book, "Borrow rejected: unknown book");
                Err(AppError::book_not_found())
            }
            BorrowOutcome::Insufficient { available } => {
                tracing::info!(
                    book_id = %request.book,
                    available,
                    requested = request.quantity,
                    "Borrow rejected: insufficient inventory"
                );
                Err(AppError::InsufficientInventory {
                    available,
                    requested: request.quantity,
                })
            }
        }
    }
}
