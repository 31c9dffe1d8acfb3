//! # Printable Quotation
//!
//! Builds the document a customer receives from a stored [`Quotation`].
//!
//! ## Page Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FURNISURE                              INVOICE NO:   CE0016-21-22      │
//! │  ✉ Furnisure@gmail.com                   INVOICE DATE: 03/05/2021        │
//! │  ☏ 9737888669                            TOTAL DUE:    ₹802.40           │
//! │  GST. 24BOGPG5365H1ZZ                                                   │
//! │                                                                         │
//! │  BILL TO, name / address / city / mobile                                │
//! │                                                                         │
//! │  DESCRIPTION               PRICE     QTY.      TOTAL                    │
//! │  Dining chair             170.00        4     680.00                    │
//! │                                                                         │
//! │                              Sub Total    ₹680.00                       │
//! │                              CGST (9%)     ₹61.20                       │
//! │                              SGST (9%)     ₹61.20                       │
//! │                              Grand Total  ₹802.40                       │
//! │                                                                         │
//! │  Composition note      Payment Info.         FURNISURE / Proprietor     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering never changes a stored amount. Every stored total is printed
//! as it is; only the amounts a record lacks are derived through
//! [`compute_totals`], and [`TotalsSource`] says which happened.

use serde::Serialize;
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;
use crate::totals::{compute_totals, Totals};
use crate::types::{BillTo, CompanyProfile, Quotation};

const COMPOSITION_NOTE: &str =
    "Composition taxable person, not eligible to collect tax on supplies.";

const PAGE_WIDTH: usize = 72;

/// Where the printed totals came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TotalsSource {
    /// The amounts stored with the record.
    Stored,
    /// Some amounts stored, the missing ones recomputed.
    Partial,
    /// Recomputed because the record has no stored totals.
    Recomputed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintableLine {
    pub description: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintableQuotation {
    pub company: CompanyProfile,
    pub invoice_no: String,
    /// `DD/MM/YYYY`
    pub invoice_date: String,
    pub bill_to: BillTo,
    pub lines: Vec<PrintableLine>,
    pub cgst_label: String,
    pub sgst_label: String,
    pub totals: Totals,
    pub totals_source: TotalsSource,
}

impl PrintableQuotation {
    /// Lays out `quotation` under `company`'s letterhead.
    ///
    /// Fails only when a record with missing totals cannot be recomputed
    /// (an item total overflows).
    pub fn build(
        quotation: &Quotation,
        company: &CompanyProfile,
    ) -> Result<Self, ValidationError> {
        let stored = quotation.totals;
        let (totals, totals_source) = match stored.complete() {
            Some(totals) => (totals, TotalsSource::Stored),
            None => {
                let computed = compute_totals(&quotation.items, quotation.rates)?;
                let source = if stored.is_empty() {
                    TotalsSource::Recomputed
                } else {
                    TotalsSource::Partial
                };
                (stored.or_computed(computed), source)
            }
        };

        let lines = quotation
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let line_total = item.line_total().ok_or_else(|| {
                    ValidationError::Overflow {
                        field: "lineTotal".to_string(),
                    }
                    .for_item(index)
                })?;
                Ok(PrintableLine {
                    description: item.description.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    line_total,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(PrintableQuotation {
            company: company.clone(),
            invoice_no: quotation.number.clone(),
            invoice_date: quotation.date.format("%d/%m/%Y").to_string(),
            bill_to: quotation.bill_to.clone(),
            lines,
            cgst_label: format!("CGST ({})", quotation.rates.cgst.label()),
            sgst_label: format!("SGST ({})", quotation.rates.sgst.label()),
            totals,
            totals_source,
        })
    }

    /// Amount printed next to "TOTAL DUE".
    pub fn total_due(&self) -> Money {
        self.totals.grand_total
    }
}

impl fmt::Display for PrintableQuotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(PAGE_WIDTH);
        let thin = "-".repeat(PAGE_WIDTH);

        // Header
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<40}{:>32}",
            self.company.name.to_uppercase(),
            format!("INVOICE NO: {}", self.invoice_no)
        )?;
        writeln!(
            f,
            "{:<40}{:>32}",
            self.company.email,
            format!("INVOICE DATE: {}", self.invoice_date)
        )?;
        writeln!(
            f,
            "{:<40}{:>32}",
            self.company.phone,
            format!("TOTAL DUE: {}", self.total_due())
        )?;
        writeln!(f, "{}", self.company.address)?;
        writeln!(f, "GST. {}", self.company.gst_number)?;
        writeln!(f, "{}", thin)?;

        // Bill to
        writeln!(f, "BILL TO,")?;
        writeln!(f, "Customer Name: {}", self.bill_to.name)?;
        writeln!(f, "Address: {}", self.bill_to.address)?;
        writeln!(f, "City: {}", self.bill_to.city)?;
        writeln!(f, "Mobile No.: {}", self.bill_to.mobile)?;
        writeln!(f, "{}", thin)?;

        // Items
        writeln!(
            f,
            "{:<36}{:>12}{:>8}{:>16}",
            "DESCRIPTION", "PRICE", "QTY.", "TOTAL"
        )?;
        for line in &self.lines {
            writeln!(
                f,
                "{:<36}{:>12}{:>8}{:>16}",
                line.description,
                line.unit_price.to_decimal_string(),
                line.quantity,
                line.line_total.to_decimal_string()
            )?;
        }
        writeln!(f, "{}", thin)?;

        // Totals
        let rows = [
            ("Sub Total", self.totals.subtotal),
            (self.cgst_label.as_str(), self.totals.cgst_amount),
            (self.sgst_label.as_str(), self.totals.sgst_amount),
            ("Grand Total", self.totals.grand_total),
        ];
        for (label, amount) in rows {
            writeln!(f, "{:>52}{:>20}", label, amount.to_string())?;
        }
        writeln!(f, "{}", thin)?;

        // Footer
        writeln!(f, "{}", COMPOSITION_NOTE)?;
        writeln!(f)?;
        writeln!(f, "Payment Info.")?;
        writeln!(f, "A/C NAME : {}", self.company.name.to_uppercase())?;
        writeln!(f, "A/C NUMBER :")?;
        writeln!(f, "IFSC CODE :")?;
        writeln!(f, "BANK :")?;
        writeln!(f, "BRANCH :")?;
        writeln!(f)?;
        writeln!(f, "{:>72}", self.company.name.to_uppercase())?;
        writeln!(f, "{:>72}", "Proprietor")?;
        writeln!(f, "{:>72}", "Authorised Sign.")?;
        write!(f, "{}", rule)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::{GstRates, StoredTotals};
    use crate::types::LineItem;
    use chrono::{NaiveDate, Utc};

    fn quotation(totals: StoredTotals) -> Quotation {
        let now = Utc::now();
        Quotation {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            number: "CE0016-21-22".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 5, 3).unwrap(),
            bill_to: BillTo {
                name: "Shantinath Agency".to_string(),
                city: "Bharuch".to_string(),
                ..BillTo::default()
            },
            items: vec![LineItem {
                description: "Dining chair".to_string(),
                unit_price: Money::from_paise(17000),
                quantity: 4,
            }],
            rates: GstRates::standard(),
            totals,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stored_totals_are_printed_as_stored() {
        // A legacy record whose stored grand total disagrees with its items
        let stored = Totals {
            subtotal: Money::from_paise(68000),
            cgst_amount: Money::from_paise(6120),
            sgst_amount: Money::from_paise(6120),
            grand_total: Money::from_paise(74120),
        };
        let page = PrintableQuotation::build(&quotation(stored.into()), &CompanyProfile::default())
            .unwrap();

        assert_eq!(page.totals_source, TotalsSource::Stored);
        assert_eq!(page.total_due(), Money::from_paise(74120));
    }

    #[test]
    fn test_missing_totals_are_recomputed() {
        let page =
            PrintableQuotation::build(&quotation(StoredTotals::default()), &CompanyProfile::default()).unwrap();

        assert_eq!(page.totals_source, TotalsSource::Recomputed);
        assert_eq!(page.totals.cgst_amount, Money::from_paise(6120));
        assert_eq!(page.total_due(), Money::from_paise(80240));
    }

    #[test]
    fn test_partial_totals_keep_stored_amounts() {
        // Legacy record with no SGST and a grand total that left it out
        let stored = StoredTotals {
            subtotal: Some(Money::from_paise(68000)),
            cgst_amount: Some(Money::from_paise(6120)),
            sgst_amount: None,
            grand_total: Some(Money::from_paise(74120)),
        };
        let page =
            PrintableQuotation::build(&quotation(stored), &CompanyProfile::default()).unwrap();

        assert_eq!(page.totals_source, TotalsSource::Partial);
        assert_eq!(page.totals.subtotal, Money::from_paise(68000));
        assert_eq!(page.totals.sgst_amount, Money::from_paise(6120));
        assert_eq!(page.total_due(), Money::from_paise(74120));
    }

    #[test]
    fn test_layout_fields() {
        let page =
            PrintableQuotation::build(&quotation(StoredTotals::default()), &CompanyProfile::default()).unwrap();

        assert_eq!(page.invoice_no, "CE0016-21-22");
        assert_eq!(page.invoice_date, "03/05/2021");
        assert_eq!(page.cgst_label, "CGST (9%)");
        assert_eq!(page.lines[0].line_total, Money::from_paise(68000));
    }

    #[test]
    fn test_text_page() {
        let text = PrintableQuotation::build(&quotation(StoredTotals::default()), &CompanyProfile::default())
            .unwrap()
            .to_string();

        assert!(text.contains("INVOICE NO: CE0016-21-22"));
        assert!(text.contains("INVOICE DATE: 03/05/2021"));
        assert!(text.contains("TOTAL DUE: ₹802.40"));
        assert!(text.contains("Customer Name: Shantinath Agency"));
        assert!(text.contains("680.00"));
        assert!(text.contains("SGST (9%)"));
        assert!(text.contains(COMPOSITION_NOTE));
        assert!(text.contains("Authorised Sign."));
    }

    #[test]
    fn test_exempt_labels() {
        let mut q = quotation(StoredTotals::default());
        q.rates = GstRates::exempt();
        let page = PrintableQuotation::build(&q, &CompanyProfile::default()).unwrap();

        assert_eq!(page.cgst_label, "CGST (0%)");
        assert_eq!(page.total_due(), Money::from_paise(68000));
    }
}
