//! # API Error Type
//!
//! Unified error type for quotation commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Furnisure Quotations                   │
//! │                                                                         │
//! │  Command Function  →  Result<T, ApiError>                              │
//! │         │                                                               │
//! │         ├── ValidationError ───────────────► VALIDATION_ERROR          │
//! │         │   (nothing was written)                                       │
//! │         │                                                               │
//! │         ├── counter failure ───────────────► COUNTER_UNAVAILABLE       │
//! │         │   (no number was assigned)                                    │
//! │         │                                                               │
//! │         ├── UNIQUE(quotations.number) ─────► DUPLICATE_NUMBER          │
//! │         │   (logged at error level: numbering is broken)               │
//! │         │                                                               │
//! │         ├── DbError::NotFound ─────────────► NOT_FOUND                 │
//! │         │                                                               │
//! │         └── other DbError ─────────────────► DATABASE_ERROR            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI prints the serialized error:
//! ```json
//! { "code": "NOT_FOUND", "message": "Quotation not found: 7f3c..." }
//! ```

use serde::Serialize;

use furnisure_core::{CoreError, ValidationError};
use furnisure_db::DbError;

/// API error returned from commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No quotation with the given id
    NotFound,

    /// Input validation failed; nothing was persisted
    ValidationError,

    /// The sequence counter could not be read or advanced
    CounterUnavailable,

    /// Two quotations would share a number
    DuplicateNumber,

    /// Database operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The counter failed; no number could be assigned.
    pub fn counter_unavailable(counter: &str, err: DbError) -> Self {
        tracing::error!(counter = %counter, error = %err, "Sequence counter unavailable");
        ApiError::new(
            ErrorCode::CounterUnavailable,
            format!("Quotation number counter '{}' is unavailable", counter),
        )
    }

    /// A number that should be unique is already stored.
    pub fn duplicate_number(number: &str) -> Self {
        tracing::error!(
            number = %number,
            "Duplicate quotation number: the sequence counter handed out a value already in use"
        );
        ApiError::new(
            ErrorCode::DuplicateNumber,
            format!("Quotation number {} already exists", number),
        )
    }
}

/// A number collision is escalated here and nowhere else.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } if field == furnisure_db::NUMBER_COLUMN => {
                ApiError::duplicate_number(&value)
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Unavailable(e) => {
                tracing::error!("Database unavailable: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            DbError::ConstraintViolation(e) => {
                tracing::error!("Constraint violated: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database rejected the write")
            }
            DbError::Migration(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::Query(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::CorruptRow { entity, message } => {
                tracing::error!(entity = %entity, "Corrupt row: {}", message);
                ApiError::new(ErrorCode::DatabaseError, format!("Stored {} is corrupt", entity))
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidDocumentNumber(number) => {
                ApiError::validation(format!("Invalid quotation number: {}", number))
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
