//! Error types for the library ledger server

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;

/// Per-field validation messages, keyed by payload field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fold the errors reported by a `validator` derive into this map
    pub fn extend_from(&mut self, errors: &validator::ValidationErrors) {
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", field, failure.code));
                self.add(field.to_string(), message);
            }
        }
    }

    /// `Ok(())` when no violation was recorded, the validation failure otherwise
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("Duplicate key: {field} = {value}")]
    DuplicateKey { field: String, value: String },

    #[error("Only {available} copies available, requested {requested}")]
    InsufficientInventory { available: i32, requested: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable kind reported in the `error.name` field
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationFailed",
            AppError::NotFound(_) => "NotFound",
            AppError::DuplicateKey { .. } => "DuplicateKey",
            AppError::InsufficientInventory { .. } => "InsufficientInventory",
            AppError::Database(_) | AppError::Internal(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateKey { .. } => StatusCode::CONFLICT,
            AppError::InsufficientInventory { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn book_not_found() -> Self {
        AppError::NotFound("Book not found".to_string())
    }
}

/// Failure envelope detail
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    /// Error kind (ValidationFailed, NotFound, DuplicateKey, InsufficientInventory, InternalError)
    pub name: String,
    /// Kind-specific detail, per-field messages for validation failures
    #[schema(value_type = Object)]
    pub errors: Value,
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: Option<ErrorBody>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let name = self.kind().to_string();

        let (message, errors) = match self {
            AppError::Validation(fields) => (
                "Validation failed".to_string(),
                serde_json::to_value(&fields).unwrap_or_else(|_| json!({})),
            ),
            AppError::NotFound(msg) => (msg, json!({})),
            AppError::DuplicateKey { field, value } => {
                let mut detail = serde_json::Map::new();
                detail.insert(field, Value::String(value));
                ("Duplicate key error".to_string(), Value::Object(detail))
            }
            AppError::InsufficientInventory { available, requested } => (
                format!("Only {} copies available, requested {}", available, requested),
                json!({ "available": available, "requested": requested }),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Internal server error".to_string(), json!({}))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), json!({}))
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: Some(ErrorBody { name, errors }),
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
