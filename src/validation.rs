//! Payload validation
//!
//! Every function here is pure: it takes the raw request input (and the clock
//! when a rule depends on it) and returns either a normalized typed payload or
//! `AppError::Validation` listing every violated field. Strings are trimmed
//! before length rules are applied.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::LibraryConfig,
    error::{AppError, AppResult, FieldErrors},
    models::book::{BookListParams, SortDirection, SortField},
    models::{BookListQuery, BookPatch, Genre, NewBook, NewBorrow},
};

const GENRE_MESSAGE: &str =
    "Genre must be one of: FICTION, NON_FICTION, SCIENCE, HISTORY, BIOGRAPHY, FANTASY.";

/// Creation rules that depend on configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateRules {
    /// Accept `copies = 0` for a new book
    pub allow_zero_stock: bool,
}

impl From<&LibraryConfig> for CreateRules {
    fn from(config: &LibraryConfig) -> Self {
        Self {
            allow_zero_stock: config.allow_zero_stock_creation,
        }
    }
}

// ---------------------------------------------------------------------------
// Drafts checked by the validator derive
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Validate)]
struct BookDraft {
    #[validate(length(min = 10, max = 50, message = "Title must be between 10 and 50 characters."))]
    title: Option<String>,
    #[validate(length(min = 5, max = 20, message = "Author name must be between 5 and 20 characters."))]
    author: Option<String>,
    #[validate(length(min = 1, message = "ISBN is mandatory."))]
    isbn: Option<String>,
    #[validate(range(min = 0, message = "Copies must be a non-negative number."))]
    copies: Option<i64>,
    genre: Option<Genre>,
    description: Option<String>,
}

#[derive(Debug, Default, Validate)]
struct BorrowDraft {
    #[validate(length(min = 1, message = "Book ID is mandatory"))]
    book: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be positive integer"))]
    quantity: Option<i64>,
}

// ---------------------------------------------------------------------------
// Raw JSON readers
// ---------------------------------------------------------------------------

fn as_object<'a>(raw: &'a Value) -> AppResult<&'a Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| AppError::Validation(FieldErrors::single("body", "Request body must be a JSON object.")))
}

fn is_missing(obj: &Map<String, Value>, field: &str) -> bool {
    matches!(obj.get(field), None | Some(Value::Null))
}

/// Trimmed string value; `null` counts as absent
fn read_string(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            errors.add(field, format!("{} must be a string.", field));
            None
        }
    }
}

/// Integral JSON number; `3.0` is accepted, `3.5` and `"3"` are not
fn read_integer(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<i64> {
    let number = match obj.get(field) {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => n,
        Some(_) => {
            errors.add(field, format!("{} must be an integer.", field));
            return None;
        }
    };

    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => Some(f as i64),
        Some(f) if f.fract() == 0.0 => {
            errors.add(field, format!("{} is too large.", field));
            None
        }
        _ => {
            errors.add(field, format!("{} must be an integer.", field));
            None
        }
    }
}

fn read_genre(obj: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Genre> {
    let raw = read_string(obj, "genre", errors)?;
    match raw.parse::<Genre>() {
        Ok(genre) => Some(genre),
        Err(()) => {
            errors.add("genre", GENRE_MESSAGE);
            None
        }
    }
}

fn narrow(value: Option<i64>, field: &str, errors: &mut FieldErrors) -> Option<i32> {
    let value = value?;
    match i32::try_from(value) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, format!("{} is too large.", field));
            None
        }
    }
}

fn read_book_draft(obj: &Map<String, Value>, errors: &mut FieldErrors) -> BookDraft {
    // `available` is derived from copies and is ignored when sent
    let draft = BookDraft {
        title: read_string(obj, "title", errors),
        author: read_string(obj, "author", errors),
        isbn: read_string(obj, "isbn", errors),
        copies: read_integer(obj, "copies", errors),
        genre: read_genre(obj, errors),
        description: read_string(obj, "description", errors),
    };
    if let Err(e) = draft.validate() {
        errors.extend_from(&e);
    }
    draft
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

/// Validate a creation payload: every field except `description` is required.
pub fn validate_new_book(raw: &Value, rules: CreateRules) -> AppResult<NewBook> {
    let obj = as_object(raw)?;
    let mut errors = FieldErrors::new();
    let draft = read_book_draft(obj, &mut errors);

    for (field, message) in [
        ("title", "Book title is mandatory."),
        ("author", "Book author is mandatory."),
        ("genre", "Book genre is mandatory."),
        ("isbn", "ISBN is mandatory."),
        ("copies", "Number of copies is mandatory."),
    ] {
        if is_missing(obj, field) {
            errors.add(field, message);
        }
    }

    if draft.copies == Some(0) && !rules.allow_zero_stock {
        errors.add("copies", "Copies must be at least 1.");
    }
    let copies = narrow(draft.copies, "copies", &mut errors);

    match (draft.title, draft.author, draft.genre, draft.isbn, copies) {
        (Some(title), Some(author), Some(genre), Some(isbn), Some(copies)) if errors.is_empty() => Ok(NewBook {
            title,
            author,
            genre,
            isbn,
            description: draft.description.unwrap_or_default(),
            copies,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

/// Validate a partial update: absent fields stay untouched, present ones obey
/// the creation rules except that `copies` may be zero.
pub fn validate_book_patch(raw: &Value) -> AppResult<BookPatch> {
    let obj = as_object(raw)?;
    let mut errors = FieldErrors::new();
    let draft = read_book_draft(obj, &mut errors);
    let copies = narrow(draft.copies, "copies", &mut errors);
    errors.into_result()?;

    Ok(BookPatch {
        title: draft.title,
        author: draft.author,
        genre: draft.genre,
        isbn: draft.isbn,
        description: draft.description,
        copies,
    })
}

/// Resolve list parameters into the closed query configuration.
/// Unrecognized values are rejected; empty values fall back to the defaults.
pub fn validate_list_query(params: &BookListParams, config: &LibraryConfig) -> AppResult<BookListQuery> {
    let mut errors = FieldErrors::new();
    let present = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let genre = present(&params.filter).and_then(|raw| match raw.parse::<Genre>() {
        Ok(genre) => Some(genre),
        Err(()) => {
            errors.add("filter", GENRE_MESSAGE);
            None
        }
    });

    let sort_by = match present(&params.sort_by) {
        None => SortField::default(),
        Some(raw) => SortField::from_param(&raw).unwrap_or_else(|| {
            errors.add("sortBy", "sortBy must be one of: createdAt, updatedAt, title, author, copies.");
            SortField::default()
        }),
    };

    let direction = match present(&params.sort) {
        None => SortDirection::default(),
        Some(raw) => SortDirection::from_param(&raw).unwrap_or_else(|| {
            errors.add("sort", "sort must be either asc or desc.");
            SortDirection::default()
        }),
    };

    let limit = match present(&params.limit) {
        None => config.default_list_limit,
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if (1..=config.max_list_limit).contains(&limit) => limit,
            _ => {
                errors.add(
                    "limit",
                    format!("limit must be an integer between 1 and {}.", config.max_list_limit),
                );
                config.default_list_limit
            }
        },
    };

    errors.into_result()?;
    Ok(BookListQuery {
        genre,
        sort_by,
        direction,
        limit,
    })
}

/// Validate the bulk delete body `{ "ids": [...] }`; duplicates are collapsed.
pub fn validate_bulk_delete(raw: &Value) -> AppResult<Vec<Uuid>> {
    let obj = as_object(raw)?;
    let mut errors = FieldErrors::new();

    let items = match obj.get("ids") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            errors.add("ids", "ids must be a non-empty array of book IDs.");
            return Err(AppError::Validation(errors));
        }
    };

    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok()) {
            Some(id) => {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
            None => errors.add("ids", format!("ids[{}] is not a valid book ID.", index)),
        }
    }

    errors.into_result()?;
    Ok(ids)
}

/// Parse a book identifier taken from the request path
pub fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Validation(FieldErrors::single("id", format!("'{}' is not a valid book ID.", raw))))
}

// ---------------------------------------------------------------------------
// Borrows
// ---------------------------------------------------------------------------

/// Validate a borrow request against the clock reading `now`.
pub fn validate_new_borrow(raw: &Value, now: DateTime<Utc>) -> AppResult<NewBorrow> {
    let obj = as_object(raw)?;
    let mut errors = FieldErrors::new();

    let draft = BorrowDraft {
        book: read_string(obj, "book", &mut errors),
        quantity: read_integer(obj, "quantity", &mut errors),
    };
    if let Err(e) = draft.validate() {
        errors.extend_from(&e);
    }

    if is_missing(obj, "book") {
        errors.add("book", "Book ID is mandatory");
    }
    if is_missing(obj, "quantity") {
        errors.add("quantity", "Quantity is mandatory");
    }
    if is_missing(obj, "dueDate") {
        errors.add("dueDate", "Due date is mandatory");
    }

    let book = draft
        .book
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| match Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("book", "Book ID is not a valid identifier");
                None
            }
        });

    let quantity = narrow(draft.quantity, "quantity", &mut errors);

    let due_date = read_string(obj, "dueDate", &mut errors).and_then(|raw| {
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(parsed) => {
                let due = parsed.with_timezone(&Utc);
                if due > now {
                    Some(due)
                } else {
                    errors.add("dueDate", "Due date must be in the future");
                    None
                }
            }
            Err(_) => {
                errors.add("dueDate", "Due date must be an ISO 8601 timestamp with offset");
                None
            }
        }
    });

    match (book, quantity, due_date) {
        (Some(book), Some(quantity), Some(due_date)) if errors.is_empty() => Ok(NewBorrow {
            book,
            quantity,
            due_date,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}
