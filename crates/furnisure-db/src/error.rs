//! # Database Error Types
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error                          DbError                           │
//! │  ───────────                          ───────                           │
//! │  Database(kind = UniqueViolation) ──► UniqueViolation { field, value }  │
//! │  Database(kind = ForeignKey/Check/                                      │
//! │           NotNull)                ──► ConstraintViolation               │
//! │  Database(SQLITE_BUSY*)           ──► Unavailable  (lock held too long) │
//! │  PoolTimedOut / PoolClosed / Io   ──► Unavailable                       │
//! │  ColumnDecode / Decode            ──► CorruptRow                        │
//! │  anything else                    ──► Query                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Unavailable` is what the command layer reports as a counter outage when
//! it happens while taking a number.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write. `field` is `table.column` as
    /// SQLite reports it; `value` is filled in by the repository when known.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A CHECK, NOT NULL or FOREIGN KEY constraint rejected the write.
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    /// The store could not be reached: file can't be opened, the pool is
    /// closed or exhausted, or the write lock stayed busy past the timeout.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt {entity} row: {message}")]
    CorruptRow { entity: String, message: String },
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn corrupt(entity: impl Into<String>, message: impl Into<String>) -> Self {
        DbError::CorruptRow {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Whether this is a unique violation on `column` (e.g. `quotations.number`).
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::Unavailable(_))
    }
}

/// SQLite primary/extended result codes for a busy database.
const SQLITE_BUSY_CODES: [&str; 3] = ["5", "261", "517"];

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => {
                        // "UNIQUE constraint failed: quotations.number"
                        let field = message
                            .rsplit_once(": ")
                            .map(|(_, columns)| columns.to_string())
                            .unwrap_or_else(|| "unknown".to_string());
                        DbError::duplicate(field, "unknown")
                    }
                    ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation => DbError::ConstraintViolation(message),
                    _ => {
                        let busy = db_err
                            .code()
                            .is_some_and(|code| SQLITE_BUSY_CODES.contains(&code.as_ref()));
                        if busy {
                            DbError::Unavailable(message)
                        } else {
                            DbError::Query(message)
                        }
                    }
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::Unavailable("timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::Unavailable(e.to_string()),

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::corrupt("Row", format!("column {}: {}", index, source))
            }
            sqlx::Error::Decode(e) => DbError::corrupt("Row", e.to_string()),

            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}
