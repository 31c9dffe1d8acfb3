//! # Domain Types
//!
//! Core domain types used throughout Furnisure quotations.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Quotation     │   │    LineItem     │   │     BillTo      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  description    │   │  name           │       │
//! │  │  number (CE..)  │   │  unit_price     │   │  address        │       │
//! │  │  date           │   │  quantity       │   │  city           │       │
//! │  │  rates, totals  │   └─────────────────┘   │  mobile         │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │ QuotationInput  │   │ CompanyProfile  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  raw request    │   │  letterhead     │       │
//! │  │  900 = 9%       │   │  (unvalidated)  │   │  details        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every quotation has:
//! - `id`: UUID v4 - storage key, used by update/delete
//! - `number`: `CE0016-21-22` - human-readable, assigned once, never changed

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::totals::{GstRates, StoredTotals};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 900 bps = 9% (CGST or SGST half of 18% GST)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Percentage label for documents: `"9%"`, `"2.5%"`, `"0.25%"`.
    pub fn label(&self) -> String {
        let whole = self.0 / 100;
        let fraction = self.0 % 100;
        if fraction == 0 {
            format!("{}%", whole)
        } else if fraction % 10 == 0 {
            format!("{}.{}%", whole, fraction / 10)
        } else {
            format!("{}.{:02}%", whole, fraction)
        }
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Bill To
// =============================================================================

/// The customer block printed under "BILL TO".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct BillTo {
    pub name: String,
    pub address: String,
    pub city: String,
    pub mobile: String,
}

// =============================================================================
// Line Item
// =============================================================================

/// A line on a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Non-empty description shown in the items table.
    pub description: String,

    /// Unit price in paise.
    pub unit_price: Money,

    /// Positive quantity.
    pub quantity: i64,
}

impl LineItem {
    /// `unit_price × quantity`, unrounded. `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// A numbered quotation as persisted by the quotation store.
///
/// Quotations created or updated here always carry all four totals; only
/// records imported from the legacy system can have gaps in `totals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Document number, e.g. `CE0016-21-22`. Immutable once assigned.
    pub number: String,

    /// Quotation date; selects the fiscal year in `number`.
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub bill_to: BillTo,

    /// Ordered, non-empty.
    pub items: Vec<LineItem>,

    /// CGST/SGST rates the totals were computed with.
    pub rates: GstRates,

    /// Stored subtotal, CGST, SGST and grand total.
    pub totals: StoredTotals,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Request Types
// =============================================================================

/// An amount as it arrives in a request: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    /// The decimal text of this amount.
    pub fn as_decimal_text(&self) -> String {
        match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) => s.clone(),
        }
    }
}

/// A line item as submitted by the quotation form.
///
/// `quantity` is taken in the same loose shape as `price` so that `"4"`
/// or `4.5` reach validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemInput {
    pub description: Option<String>,
    pub price: Option<AmountInput>,
    pub quantity: Option<AmountInput>,
}

/// An unvalidated create/update request, field-compatible with the
/// quotation form (`quotationDate`, `billTo`, `items`, optional totals).
///
/// Validation turns it into a [`QuotationDraft`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuotationInput {
    pub quotation_date: Option<String>,
    pub bill_to: BillTo,
    pub items: Vec<LineItemInput>,
    pub subtotal: Option<AmountInput>,
    pub cgst_amount: Option<AmountInput>,
    pub sgst_amount: Option<AmountInput>,
    pub grand_total: Option<AmountInput>,
}

/// Totals claimed by a caller; any subset may be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimedTotals {
    pub subtotal: Option<Money>,
    pub cgst_amount: Option<Money>,
    pub sgst_amount: Option<Money>,
    pub grand_total: Option<Money>,
}

/// A validated quotation body, ready to be totalled and numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationDraft {
    pub date: NaiveDate,
    pub bill_to: BillTo,
    pub items: Vec<LineItem>,
    pub claimed: ClaimedTotals,
}

// =============================================================================
// Company Profile
// =============================================================================

/// Letterhead details printed on every quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub gst_number: String,
    pub email: String,
    pub phone: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        CompanyProfile {
            name: "Furnisure".to_string(),
            address: "618,Shreeji Park Society, Hightention line road, Subhanpura, Vadodara-390021"
                .to_string(),
            gst_number: "24BOGPG5365H1ZZ".to_string(),
            email: "Furnisure@gmail.com".to_string(),
            phone: "9737888669".to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_label() {
        assert_eq!(TaxRate::from_bps(900).label(), "9%");
        assert_eq!(TaxRate::from_bps(250).label(), "2.5%");
        assert_eq!(TaxRate::from_bps(25).label(), "0.25%");
        assert_eq!(TaxRate::zero().label(), "0%");
    }

    #[test]
    fn test_line_total_is_unrounded_product() {
        let item = LineItem {
            description: "Teak chair".to_string(),
            unit_price: Money::from_paise(17000),
            quantity: 4,
        };
        assert_eq!(item.line_total(), Some(Money::from_paise(68000)));
    }

    #[test]
    fn test_quotation_input_accepts_form_payload() {
        let input: QuotationInput = serde_json::from_str(
            r#"{
                "quotationDate": "2021-05-10",
                "billTo": { "name": "Shantinath Agency", "city": "Bharuch" },
                "items": [{ "description": "Sofa", "price": 170, "quantity": 4 }],
                "subtotal": "680.00"
            }"#,
        )
        .unwrap();

        assert_eq!(input.quotation_date.as_deref(), Some("2021-05-10"));
        assert_eq!(input.bill_to.city, "Bharuch");
        assert_eq!(input.bill_to.mobile, "");
        assert_eq!(input.items.len(), 1);
        assert_eq!(
            input.items[0].price.as_ref().map(AmountInput::as_decimal_text),
            Some("170".to_string())
        );
        assert_eq!(
            input.subtotal,
            Some(AmountInput::Text("680.00".to_string()))
        );
        assert!(input.grand_total.is_none());
    }

    #[test]
    fn test_company_profile_defaults() {
        let company = CompanyProfile::default();
        assert_eq!(company.name, "Furnisure");
        assert_eq!(company.gst_number, "24BOGPG5365H1ZZ");
    }
}
