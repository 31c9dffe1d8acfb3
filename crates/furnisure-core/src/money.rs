//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    680 * 0.09 = 61.199999999999996  ❌ WRONG!                           │
//! │                                                                         │
//! │  A form that shows ₹61.20 and a PDF that shows ₹61.19 disagree about   │
//! │  the same quotation.                                                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    68000 paise × 900 bps = 6120 paise, exactly                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use furnisure_core::money::Money;
//!
//! // Create from paise (preferred)
//! let price = Money::from_paise(17000); // ₹170.00
//!
//! // Or parse a decimal amount exactly
//! let same = Money::parse_decimal("170.00").unwrap();
//! assert_eq!(price, same);
//!
//! // Arithmetic operations
//! let line = price.checked_multiply_quantity(4).unwrap(); // ₹680.00
//! assert_eq!(line.to_decimal_string(), "680.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic never needs a cast, validation rejects
///   negative prices at the boundary
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as integer paise**: the same representation in SQLite,
///   JSON output and the TypeScript bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use furnisure_core::money::Money;
    ///
    /// let price = Money::from_paise(17050); // ₹170.50
    /// assert_eq!(price.paise(), 17050);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Parses a decimal amount such as `"170"`, `"170.5"` or `"170.50"`.
    ///
    /// ## Rules
    /// - Optional leading `-`, digits, optional `.` with at most 2 digits
    /// - More than 2 fractional digits is rejected, never rounded: a unit
    ///   price is a 2-decimal amount, so line totals stay exact
    ///
    /// ## Example
    /// ```rust
    /// use furnisure_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("170.5").unwrap().paise(), 17050);
    /// assert_eq!(Money::parse_decimal("0.07").unwrap().paise(), 7);
    /// assert!(Money::parse_decimal("10.125").is_err());
    /// assert!(Money::parse_decimal("abc").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let parts = DecimalParts::split(input)?;
        if parts.fraction.len() > 2 {
            return Err(invalid_amount("must have at most 2 decimal places"));
        }
        parts.to_money(false)
    }

    /// Parses a decimal amount, rounding half-up (away from zero) to the
    /// nearest paisa when more than 2 fractional digits are present.
    ///
    /// Only for amounts that were already stored by another system, e.g.
    /// `61.199999999999996` written by a browser form. New input goes
    /// through [`Money::parse_decimal`].
    ///
    /// ## Example
    /// ```rust
    /// use furnisure_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal_rounded("61.199999999999996").unwrap().paise(), 6120);
    /// assert_eq!(Money::parse_decimal_rounded("0.125").unwrap().paise(), 13);
    /// assert_eq!(Money::parse_decimal_rounded("0.124").unwrap().paise(), 12);
    /// ```
    pub fn parse_decimal_rounded(input: &str) -> Result<Money, ValidationError> {
        let parts = DecimalParts::split(input)?;
        let round_up = parts
            .fraction
            .as_bytes()
            .get(2)
            .map(|digit| *digit >= b'5')
            .unwrap_or(false);
        parts.to_money(round_up)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at `rate`, rounding half-up to the nearest paisa.
    ///
    /// ## Implementation
    /// Integer math: `(amount × bps + 5000) / 10000`.
    /// The +5000 is half of the divisor, so x.5 paise rounds up.
    ///
    /// ## Example
    /// ```rust
    /// use furnisure_core::money::Money;
    /// use furnisure_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_paise(68000); // ₹680.00
    /// let cgst = subtotal.calculate_tax(TaxRate::from_bps(900));
    /// assert_eq!(cgst.paise(), 6120); // ₹61.20
    ///
    /// // ₹0.05 at 9% = 0.45 paise → 0; ₹0.06 at 9% = 0.54 paise → 1
    /// assert_eq!(Money::from_paise(5).calculate_tax(TaxRate::from_bps(900)).paise(), 0);
    /// assert_eq!(Money::from_paise(6).calculate_tax(TaxRate::from_bps(900)).paise(), 1);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so that large subtotals × bps cannot overflow
        let tax_paise = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_paise(tax_paise as i64)
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use furnisure_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(17000);
    /// assert_eq!(unit_price.checked_multiply_quantity(4), Some(Money::from_paise(68000)));
    /// assert_eq!(Money::from_paise(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Formats as a plain 2-decimal amount (`"680.00"`), the way amounts
    /// appear on the printed quotation.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

fn invalid_amount(reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: reason.to_string(),
    }
}

/// A syntactically valid decimal split into sign, whole and fraction digits.
struct DecimalParts<'a> {
    negative: bool,
    whole: &'a str,
    fraction: &'a str,
}

impl<'a> DecimalParts<'a> {
    fn split(input: &'a str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid_amount("must be a decimal number"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid_amount("must be a decimal number"));
        }

        Ok(DecimalParts {
            negative,
            whole,
            fraction,
        })
    }

    /// Converts using the first two fraction digits, plus one paisa if `round_up`.
    fn to_money(&self, round_up: bool) -> Result<Money, ValidationError> {
        let too_large = || invalid_amount("amount is too large");

        let rupees: i64 = if self.whole.is_empty() {
            0
        } else {
            self.whole.parse().map_err(|_| too_large())?
        };

        // Digits only, at most two of them: these parses cannot fail
        let paise: i64 = match self.fraction.len() {
            0 => 0,
            1 => self.fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => self.fraction[..2].parse::<i64>().unwrap_or(0),
        };

        let magnitude = rupees
            .checked_mul(100)
            .and_then(|r| r.checked_add(paise))
            .and_then(|p| p.checked_add(i64::from(round_up)))
            .ok_or_else(too_large)?;

        Ok(Money(if self.negative { -magnitude } else { magnitude }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
