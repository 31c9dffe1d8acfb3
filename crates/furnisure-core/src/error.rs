//! # Error Types
//!
//! ```text
//! ValidationError   a request or stored record is malformed; the field
//!                   path (`items[2].price`) says where
//! CoreError         domain failures outside request validation
//!                   (e.g. an unparseable document number)
//! ```
//!
//! Storage failures live in `furnisure-db`; the command layer maps all of
//! them onto the codes callers see.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A document number does not follow `PREFIX{seq}-{YY}-{YY}`.
    ///
    /// ## When This Occurs
    /// - Importing a legacy record with a hand-edited number
    /// - Parsing a number typed by a user when looking a quotation up
    #[error("Invalid document number: {0}")]
    InvalidDocumentNumber(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A request (or imported record) that cannot be accepted.
///
/// No record is created or changed when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, unparseable date or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A quotation needs at least one line item.
    #[error("quotation must have at least one item")]
    NoItems,

    /// Amounts too large to represent.
    #[error("{field} is too large")]
    Overflow { field: String },

    /// Totals supplied by the caller disagree with the computed ones.
    ///
    /// ## When This Occurs
    /// - A form computed tax with a different rate
    /// - A form dropped SGST from the grand total
    /// - Float rounding on the client produced a different paisa
    #[error("{field} does not match computed value: supplied {supplied}, computed {computed}")]
    TotalsMismatch {
        field: String,
        supplied: Money,
        computed: Money,
    },
}

impl ValidationError {
    /// Prefixes the field with an item position, e.g. `items[2].quantity`.
    pub fn for_item(self, index: usize) -> Self {
        let scoped = |field: String| format!("items[{}].{}", index, field);
        match self {
            ValidationError::Required { field } => ValidationError::Required {
                field: scoped(field),
            },
            ValidationError::TooLong { field, max } => ValidationError::TooLong {
                field: scoped(field),
                max,
            },
            ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
                field: scoped(field),
                min,
                max,
            },
            ValidationError::MustBePositive { field } => ValidationError::MustBePositive {
                field: scoped(field),
            },
            ValidationError::Negative { field } => ValidationError::Negative {
                field: scoped(field),
            },
            ValidationError::InvalidFormat { field, reason } => ValidationError::InvalidFormat {
                field: scoped(field),
                reason,
            },
            ValidationError::Overflow { field } => ValidationError::Overflow {
                field: scoped(field),
            },
            other => other,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
