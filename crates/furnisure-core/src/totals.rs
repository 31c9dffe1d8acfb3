//! # Totals
//!
//! The one and only computation of subtotal → CGST → SGST → grand total.
//!
//! ## Who Calls This
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_quotation ──┐                                                  │
//! │                     │                                                   │
//! │  update_quotation ──┼──► compute_totals(items, rates) ──► Totals       │
//! │                     │                                                   │
//! │  renderer (only if ─┘                                                  │
//! │  stored totals are absent)                                             │
//! │                                                                         │
//! │  Same function, same rates type, same rounding: the stored record,     │
//! │  the edit form and the printed page cannot disagree.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Policy
//! Line totals are exact (`unit_price × quantity` in paise) and are summed
//! without rounding. Rounding happens once per tax half, half-up, when
//! CGST and SGST are derived from the subtotal.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ClaimedTotals, LineItem, TaxRate};

/// Central GST half (9%).
pub const CGST_RATE: TaxRate = TaxRate::from_bps(900);

/// State GST half (9%).
pub const SGST_RATE: TaxRate = TaxRate::from_bps(900);

// =============================================================================
// GST Rates
// =============================================================================

/// The CGST/SGST pair a quotation is taxed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GstRates {
    pub cgst: TaxRate,
    pub sgst: TaxRate,
}

impl GstRates {
    /// 9% + 9% = 18% GST.
    pub const fn standard() -> Self {
        GstRates {
            cgst: CGST_RATE,
            sgst: SGST_RATE,
        }
    }

    /// No tax: grand total equals subtotal.
    pub const fn exempt() -> Self {
        GstRates {
            cgst: TaxRate::zero(),
            sgst: TaxRate::zero(),
        }
    }

    pub const fn new(cgst: TaxRate, sgst: TaxRate) -> Self {
        GstRates { cgst, sgst }
    }

    pub const fn is_exempt(&self) -> bool {
        self.cgst.is_zero() && self.sgst.is_zero()
    }
}

impl Default for GstRates {
    fn default() -> Self {
        GstRates::standard()
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Computed amounts of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub grand_total: Money,
}

impl Totals {
    /// Checks caller-supplied totals against these, field by field.
    ///
    /// Absent claims are not checked; any present claim must match to the
    /// paisa.
    pub fn verify_claimed(&self, claimed: &ClaimedTotals) -> Result<(), ValidationError> {
        let checks = [
            ("subtotal", claimed.subtotal, self.subtotal),
            ("cgstAmount", claimed.cgst_amount, self.cgst_amount),
            ("sgstAmount", claimed.sgst_amount, self.sgst_amount),
            ("grandTotal", claimed.grand_total, self.grand_total),
        ];

        for (field, supplied, computed) in checks {
            if let Some(supplied) = supplied {
                if supplied != computed {
                    return Err(ValidationError::TotalsMismatch {
                        field: field.to_string(),
                        supplied,
                        computed,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Totals as kept with a stored record, one optional amount per field.
///
/// Quotations created here always store all four. Records imported from
/// the legacy system may lack any of them; present amounts are kept as
/// they were issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoredTotals {
    pub subtotal: Option<Money>,
    pub cgst_amount: Option<Money>,
    pub sgst_amount: Option<Money>,
    pub grand_total: Option<Money>,
}

impl StoredTotals {
    /// All four amounts, if all four are stored.
    pub fn complete(&self) -> Option<Totals> {
        Some(Totals {
            subtotal: self.subtotal?,
            cgst_amount: self.cgst_amount?,
            sgst_amount: self.sgst_amount?,
            grand_total: self.grand_total?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.subtotal.is_none()
            && self.cgst_amount.is_none()
            && self.sgst_amount.is_none()
            && self.grand_total.is_none()
    }

    /// Stored amounts where present, `computed` ones for the gaps.
    pub fn or_computed(&self, computed: Totals) -> Totals {
        Totals {
            subtotal: self.subtotal.unwrap_or(computed.subtotal),
            cgst_amount: self.cgst_amount.unwrap_or(computed.cgst_amount),
            sgst_amount: self.sgst_amount.unwrap_or(computed.sgst_amount),
            grand_total: self.grand_total.unwrap_or(computed.grand_total),
        }
    }
}

impl From<Totals> for StoredTotals {
    fn from(totals: Totals) -> Self {
        StoredTotals {
            subtotal: Some(totals.subtotal),
            cgst_amount: Some(totals.cgst_amount),
            sgst_amount: Some(totals.sgst_amount),
            grand_total: Some(totals.grand_total),
        }
    }
}

/// Computes the totals of `items` at `rates`.
///
/// ## Steps
/// 1. `subtotal = Σ unit_price × quantity` (exact, in paise)
/// 2. `cgst = round_half_up(subtotal × cgst_rate)`
/// 3. `sgst = round_half_up(subtotal × sgst_rate)`
/// 4. `grand_total = subtotal + cgst + sgst`
///
/// Pure and deterministic: the same items and rates always give the same
/// result.
///
/// ## Example
/// ```rust
/// use furnisure_core::money::Money;
/// use furnisure_core::totals::{compute_totals, GstRates};
/// use furnisure_core::types::LineItem;
///
/// let items = vec![LineItem {
///     description: "Dining chair".to_string(),
///     unit_price: Money::from_paise(17000),
///     quantity: 4,
/// }];
///
/// let totals = compute_totals(&items, GstRates::standard()).unwrap();
/// assert_eq!(totals.subtotal.to_decimal_string(), "680.00");
/// assert_eq!(totals.cgst_amount.to_decimal_string(), "61.20");
/// assert_eq!(totals.sgst_amount.to_decimal_string(), "61.20");
/// assert_eq!(totals.grand_total.to_decimal_string(), "802.40");
/// ```
pub fn compute_totals(items: &[LineItem], rates: GstRates) -> Result<Totals, ValidationError> {
    let mut subtotal = Money::zero();
    for (index, item) in items.iter().enumerate() {
        let line_total = item.line_total().ok_or_else(|| {
            ValidationError::Overflow {
                field: "lineTotal".to_string(),
            }
            .for_item(index)
        })?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| ValidationError::Overflow {
                field: "subtotal".to_string(),
            })?;
    }

    let cgst_amount = subtotal.calculate_tax(rates.cgst);
    let sgst_amount = subtotal.calculate_tax(rates.sgst);

    let grand_total = subtotal
        .checked_add(cgst_amount)
        .and_then(|t| t.checked_add(sgst_amount))
        .ok_or_else(|| ValidationError::Overflow {
            field: "grandTotal".to_string(),
        })?;

    Ok(Totals {
        subtotal,
        cgst_amount,
        sgst_amount,
        grand_total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
