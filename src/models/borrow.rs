//! Borrow (ledger entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One borrowing transaction, never mutated after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: Uuid,
    /// Borrowed book (weak reference)
    #[sqlx(rename = "book_id")]
    pub book: Uuid,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated borrow request
#[derive(Debug, Clone, PartialEq)]
pub struct NewBorrow {
    pub book: Uuid,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
}

impl NewBorrow {
    pub fn into_borrow(self, id: Uuid, now: DateTime<Utc>) -> Borrow {
        Borrow {
            id,
            book: self.book,
            quantity: self.quantity,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of the conditional decrement plus ledger insert
#[derive(Debug, Clone, PartialEq)]
pub enum BorrowOutcome {
    /// Inventory reserved and ledger row written
    Committed { borrow: Borrow, remaining: i32 },
    /// No book with the requested id
    BookMissing,
    /// Nothing was written
    Insufficient { available: i32 },
}

/// Create borrow request (documentation schema)
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowRequest {
    /// Book ID
    pub book: Uuid,
    /// Number of copies, at least 1
    pub quantity: i32,
    /// RFC 3339 timestamp in the future
    pub due_date: DateTime<Utc>,
}

/// Book identity in the borrow summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowedBook {
    pub title: String,
    pub isbn: String,
}

/// Total borrowed quantity for one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummary {
    pub book: BorrowedBook,
    pub total_quantity: i64,
}
