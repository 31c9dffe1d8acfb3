//! # Document Numbering
//!
//! Turns a quotation date and a counter value into a document number.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │     CE  0016  -  21  -  22                                              │
//! │     ──  ────     ──     ──                                              │
//! │     │    │       │      └── fiscal year end   (2022 → "22")             │
//! │     │    │       └───────── fiscal year start (2021 → "21")             │
//! │     │    └───────────────── counter value, zero-padded to 4 digits      │
//! │     │                       (10000 → "10000": widened, never cut)       │
//! │     └────────────────────── prefix                                      │
//! │                                                                         │
//! │  Indian fiscal year: 1 April → 31 March                                 │
//! │    2021-03-31  →  FY 2020-21  →  CE0001-20-21                           │
//! │    2021-04-01  →  FY 2021-22  →  CE0001-21-22                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure. The counter value comes from the database
//! layer; nothing in this module touches it.

use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Prefix of quotation numbers.
pub const DEFAULT_PREFIX: &str = "CE";

/// Minimum width of the sequence field.
pub const SEQUENCE_WIDTH: usize = 4;

/// Month (1-based) in which the fiscal year starts.
const FISCAL_YEAR_START_MONTH: u32 = 4;

// =============================================================================
// Fiscal Year
// =============================================================================

/// An April–March fiscal year, identified by the calendar year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// The fiscal year that contains `date`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use furnisure_core::numbering::FiscalYear;
    ///
    /// let march = NaiveDate::from_ymd_opt(2021, 3, 31).unwrap();
    /// let april = NaiveDate::from_ymd_opt(2021, 4, 1).unwrap();
    /// assert_eq!(FiscalYear::containing(march).suffix(), "20-21");
    /// assert_eq!(FiscalYear::containing(april).suffix(), "21-22");
    /// ```
    pub fn containing(date: NaiveDate) -> Self {
        let start_year = if date.month() >= FISCAL_YEAR_START_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        FiscalYear { start_year }
    }

    pub const fn starting_in(start_year: i32) -> Self {
        FiscalYear { start_year }
    }

    pub const fn start_year(&self) -> i32 {
        self.start_year
    }

    pub const fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    /// 1 April of the start year.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, FISCAL_YEAR_START_MONTH, 1)
    }

    /// 31 March of the end year.
    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.end_year(), FISCAL_YEAR_START_MONTH - 1, 31)
    }

    /// `"YY-YY"`, e.g. `"99-00"` for the fiscal year starting 1999.
    pub fn suffix(&self) -> String {
        format!(
            "{}-{}",
            two_digit_year(self.start_year),
            two_digit_year(self.end_year())
        )
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY {}-{}", self.start_year, two_digit_year(self.end_year()))
    }
}

/// Last two decimal digits, zero-padded. Always `00..=99`, even for
/// negative years.
fn two_digit_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

// =============================================================================
// Number Assembly
// =============================================================================

/// Assigns the quotation number for `date` and counter value `seq`.
///
/// Pure: the same `(date, seq)` always yields the same string.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use furnisure_core::numbering::assign_number;
///
/// let may = NaiveDate::from_ymd_opt(2021, 5, 3).unwrap();
/// assert_eq!(assign_number(may, 16), "CE0016-21-22");
/// assert_eq!(assign_number(may, 12345), "CE12345-21-22");
/// ```
pub fn assign_number(date: NaiveDate, seq: u64) -> String {
    assign_number_with_prefix(DEFAULT_PREFIX, date, seq)
}

/// [`assign_number`] with a configurable prefix.
pub fn assign_number_with_prefix(prefix: &str, date: NaiveDate, seq: u64) -> String {
    format!(
        "{}{:0width$}-{}",
        prefix,
        seq,
        FiscalYear::containing(date).suffix(),
        width = SEQUENCE_WIDTH
    )
}

// =============================================================================
// Parsing
// =============================================================================

/// The parts of an existing document number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNumber {
    pub prefix: String,
    pub sequence: u64,
    /// Two-digit start and end years as printed.
    pub fiscal_suffix: (u8, u8),
}

impl DocumentNumber {
    /// Parses `PREFIX{digits}-{YY}-{YY}`.
    ///
    /// The prefix is the leading run of ASCII letters; the sequence may be
    /// any width of at least [`SEQUENCE_WIDTH`] digits.
    ///
    /// ## Example
    /// ```rust
    /// use furnisure_core::numbering::DocumentNumber;
    ///
    /// let parsed = DocumentNumber::parse("CE0016-21-22").unwrap();
    /// assert_eq!(parsed.prefix, "CE");
    /// assert_eq!(parsed.sequence, 16);
    /// assert_eq!(parsed.fiscal_suffix, (21, 22));
    /// ```
    pub fn parse(number: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidDocumentNumber(number.to_string());

        let mut parts = number.trim().split('-');
        let head = parts.next().ok_or_else(invalid)?;
        let start = parts.next().ok_or_else(invalid)?;
        let end = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let digits_at = head
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (prefix, digits) = head.split_at(digits_at);

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if digits.len() < SEQUENCE_WIDTH || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let sequence: u64 = digits.parse().map_err(|_| invalid())?;
        let start_yy = parse_two_digits(start).ok_or_else(invalid)?;
        let end_yy = parse_two_digits(end).ok_or_else(invalid)?;

        if (start_yy + 1) % 100 != end_yy {
            return Err(invalid());
        }

        Ok(DocumentNumber {
            prefix: prefix.to_string(),
            sequence,
            fiscal_suffix: (start_yy, end_yy),
        })
    }

    /// The short form shown in record lists, e.g. `#0016`.
    pub fn short_label(&self) -> String {
        format!("#{:0width$}", self.sequence, width = SEQUENCE_WIDTH)
    }
}

fn parse_two_digits(s: &str) -> Option<u8> {
    if s.len() != 2 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
