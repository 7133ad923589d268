//! Data models for the library ledger

pub mod book;
pub mod borrow;

// Re-export commonly used types
pub use book::{Book, BookListQuery, BookPatch, Genre, NewBook, SortDirection, SortField};
pub use borrow::{Borrow, BorrowOutcome, BorrowSummary, BorrowedBook, NewBorrow};
