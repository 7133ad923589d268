//! Book model and related types

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Availability is derived from the copy count and never stored independently.
pub fn is_available(copies: i32) -> bool {
    copies > 0
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    Fiction,
    NonFiction,
    Science,
    History,
    Biography,
    Fantasy,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Science,
        Genre::History,
        Genre::Biography,
        Genre::Fantasy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "FICTION",
            Genre::NonFiction => "NON_FICTION",
            Genre::Science => "SCIENCE",
            Genre::History => "HISTORY",
            Genre::Biography => "BIOGRAPHY",
            Genre::Fantasy => "FANTASY",
        }
    }
}

impl FromStr for Genre {
    type Err = ();

    /// Case-sensitive: only the uppercase names are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

/// Catalogued title with its available inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub isbn: String,
    pub description: String,
    /// Copies currently on the shelf
    pub copies: i32,
    /// `copies > 0`
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Apply the provided fields of `patch` and recompute availability.
    pub fn apply_patch(&mut self, patch: &BookPatch, now: DateTime<Utc>) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref author) = patch.author {
            self.author = author.clone();
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(ref isbn) = patch.isbn {
            self.isbn = isbn.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(copies) = patch.copies {
            self.copies = copies;
        }
        self.available = is_available(self.copies);
        self.updated_at = now;
    }

    /// Take `quantity` copies off the shelf, refusing to go below zero.
    pub fn withdraw_copies(&mut self, quantity: i32, now: DateTime<Utc>) -> AppResult<()> {
        if quantity > self.copies {
            return Err(AppError::InsufficientInventory {
                available: self.copies,
                requested: quantity,
            });
        }
        self.copies -= quantity;
        self.available = is_available(self.copies);
        self.updated_at = now;
        Ok(())
    }
}

/// Database row; genre is stored as text
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub description: String,
    pub copies: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let genre = row
            .genre
            .parse::<Genre>()
            .map_err(|_| AppError::Internal(format!("Unknown genre '{}' stored for book {}", row.genre, row.id)))?;

        Ok(Book {
            id: row.id,
            title: row.title,
            author: row.author,
            genre,
            isbn: row.isbn,
            description: row.description,
            copies: row.copies,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Validated creation payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub isbn: String,
    pub description: String,
    pub copies: i32,
}

impl NewBook {
    pub fn into_book(self, id: Uuid, now: DateTime<Utc>) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            isbn: self.isbn,
            description: self.description,
            copies: self.copies,
            available: is_available(self.copies),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<Genre>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub copies: Option<i32>,
}

/// Create book request (documentation schema; bodies are validated from raw JSON)
#[derive(Deserialize, ToSchema)]
pub struct CreateBookRequest {
    /// 10 to 50 characters
    pub title: String,
    /// 5 to 20 characters
    pub author: String,
    pub genre: Genre,
    /// Unique across the catalogue
    pub isbn: String,
    pub description: Option<String>,
    /// At least 1 unless zero-stock creation is enabled
    pub copies: i32,
}

/// Update book request, every field optional
#[derive(Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<Genre>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub copies: Option<i32>,
}

/// Bulk delete request
#[derive(Deserialize, ToSchema)]
pub struct DeleteBooksRequest {
    pub ids: Vec<Uuid>,
}

/// Bulk delete result
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBooksResponse {
    pub deleted_count: u64,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Raw list query string parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookListParams {
    /// Exact genre to filter on
    pub filter: Option<String>,
    /// createdAt, updatedAt, title, author or copies
    pub sort_by: Option<String>,
    /// asc or desc
    pub sort: Option<String>,
    /// Maximum number of books returned
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Author,
    Copies,
}

impl SortField {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            "title" => Some(SortField::Title),
            "author" => Some(SortField::Author),
            "copies" => Some(SortField::Copies),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Copies => "copies",
        }
    }

    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Author => a.author.cmp(&b.author),
            SortField::Copies => a.copies.cmp(&b.copies),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Closed filter/sort/limit configuration for listing books
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookListQuery {
    pub genre: Option<Genre>,
    pub sort_by: SortField,
    pub direction: SortDirection,
    pub limit: i64,
}

impl Default for BookListQuery {
    fn default() -> Self {
        Self {
            genre: None,
            sort_by: SortField::default(),
            direction: SortDirection::default(),
            limit: 10,
        }
    }
}

impl BookListQuery {
    pub fn matches(&self, book: &Book) -> bool {
        self.genre.map_or(true, |genre| book.genre == genre)
    }

    /// Requested order, ties broken by id so results are stable
    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        self.direction
            .apply(self.sort_by.compare(a, b).then_with(|| a.id.cmp(&b.id)))
    }
}
