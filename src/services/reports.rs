//! Borrowing reports

use crate::{error::AppResult, models::BorrowSummary, repository::Repository};

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Total borrowed quantity per book, ordered by title then isbn
    pub async fn borrowed_summary(&self) -> AppResult<Vec<BorrowSummary>> {
        let summary = self.repository.borrows.summary().await?;
        tracing::debug!(books = summary.len(), "Borrowed books summary computed");
        Ok(summary)
    }
}
