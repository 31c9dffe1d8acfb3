//! # Legacy Import
//!
//! Loads quotations exported from the previous system, keeping their
//! numbers, and moves the sequence counter past them.
//!
//! ## Import Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Validate every record  ──── any error ──► stop, nothing written    │
//! │     (number parses, date, items, rates, each stored total)             │
//! │                                                                         │
//! │  2. counter.advance_to(highest sequence) ── error ──► COUNTER_UNAVAIL. │
//! │                                                                         │
//! │  3. Insert records one by one ── number exists ──► DUPLICATE_NUMBER    │
//! │     (records inserted before the failure stay)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter is advanced before any insert, so a quotation created while
//! an import is running can never take an imported number.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use furnisure_core::validation::{
    normalize_bill_to, parse_quotation_date, parse_stored_amount, validate_bill_to,
    validate_stored_line_item, validate_tax_rate_bps,
};
use furnisure_core::{
    AmountInput, BillTo, DocumentNumber, GstRates, LineItemInput, StoredTotals, TaxRate,
    ValidationError,
};
use furnisure_db::NewQuotation;

use super::quotation::number_conflict;
use crate::error::ApiError;
use crate::state::AppState;

/// A quotation as exported by the previous system.
///
/// Amounts may carry binary float residue (`61.199999999999996`); they are
/// rounded half-up to the paisa. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyQuotation {
    pub quotation_number: String,
    pub quotation_date: Option<String>,
    pub bill_to: BillTo,
    pub items: Vec<LineItemInput>,
    pub subtotal: Option<AmountInput>,
    pub cgst_amount: Option<AmountInput>,
    pub sgst_amount: Option<AmountInput>,
    pub grand_total: Option<AmountInput>,
    /// Percent, e.g. `9`. Applied to both CGST and SGST.
    pub cgst_percent: Option<AmountInput>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    /// Counter value after the import.
    pub counter_value: i64,
}

/// Imports `records`, preserving their numbers.
pub async fn import_legacy(
    state: &AppState,
    records: Vec<LegacyQuotation>,
) -> Result<ImportReport, ApiError> {
    debug!(records = records.len(), "import_legacy command");

    let prefix = &state.config().numbering.prefix;
    let counter = &state.config().numbering.counter_name;

    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(records.len());
    let mut highest = 0u64;

    for (index, record) in records.iter().enumerate() {
        let (parsed, new) = prepare(record).map_err(|e| {
            ApiError::new(
                e.code,
                format!("record {} ({}): {}", index, record.quotation_number, e.message),
            )
        })?;

        if !seen.insert(new.number.clone()) {
            return Err(ApiError::validation(format!(
                "record {}: number {} appears more than once",
                index, new.number
            )));
        }

        if &parsed.prefix == prefix {
            highest = highest.max(parsed.sequence);
        } else {
            warn!(
                number = %new.number,
                "Imported number has a different prefix; counter not advanced for it"
            );
        }

        prepared.push(new);
    }

    let floor = i64::try_from(highest)
        .map_err(|_| ApiError::validation(format!("sequence {} is too large", highest)))?;
    let counter_value = state
        .db()
        .counters()
        .advance_to(counter, floor)
        .await
        .map_err(|e| ApiError::counter_unavailable(counter, e))?;

    let mut imported = 0;
    for new in prepared {
        let number = new.number.clone();
        state
            .db()
            .quotations()
            .insert(new)
            .await
            .map_err(|e| number_conflict(e, &number))?;
        imported += 1;
    }

    info!(imported, counter = %counter, counter_value, "Legacy quotations imported");

    Ok(ImportReport {
        imported,
        counter_value,
    })
}

/// Validates one record and turns it into an insert.
fn prepare(record: &LegacyQuotation) -> Result<(DocumentNumber, NewQuotation), ApiError> {
    let number = DocumentNumber::parse(&record.quotation_number)?;
    let date = parse_quotation_date(record.quotation_date.as_deref())?;

    if record.items.is_empty() {
        return Err(ValidationError::NoItems.into());
    }
    let items = record
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_stored_line_item(item).map_err(|e| e.for_item(index)))
        .collect::<Result<Vec<_>, _>>()?;

    validate_bill_to(&record.bill_to)?;

    let rates = match &record.cgst_percent {
        Some(percent) => {
            // Percent to basis points: 9 -> 900, 2.5 -> 250
            let bps = parse_stored_amount("cgstPercent", percent)?.paise();
            let bps = u32::try_from(bps).map_err(|_| ValidationError::OutOfRange {
                field: "cgstPercent".to_string(),
                min: 0,
                max: 10000,
            })?;
            validate_tax_rate_bps(bps)?;
            GstRates::new(TaxRate::from_bps(bps), TaxRate::from_bps(bps))
        }
        None => GstRates::standard(),
    };

    let totals = stored_totals(record)?;
    if !totals.is_complete() {
        warn!(
            number = %record.quotation_number,
            "Imported quotation has missing totals; they will be recomputed when rendered"
        );
    }

    let created_at = match &record.created_at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ValidationError::InvalidFormat {
                field: "createdAt".to_string(),
                reason: e.to_string(),
            })?,
        None => Utc::now(),
    };

    let new = NewQuotation {
        number: record.quotation_number.trim().to_string(),
        date,
        bill_to: normalize_bill_to(&record.bill_to),
        items,
        rates,
        totals,
        created_at,
    };

    Ok((number, new))
}

/// The record's totals, each amount kept as issued when present.
fn stored_totals(record: &LegacyQuotation) -> Result<StoredTotals, ValidationError> {
    let amount = |field: &str, value: &Option<AmountInput>| {
        value
            .as_ref()
            .map(|v| parse_stored_amount(field, v))
            .transpose()
    };

    Ok(StoredTotals {
        subtotal: amount("subtotal", &record.subtotal)?,
        cgst_amount: amount("cgstAmount", &record.cgst_amount)?,
        sgst_amount: amount("sgstAmount", &record.sgst_amount)?,
        grand_total: amount("grandTotal", &record.grand_total)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use furnisure_core::Money;

    fn legacy(json: serde_json::Value) -> LegacyQuotation {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_prepare_rounds_float_totals() {
        let record = legacy(serde_json::json!({
            "_id": "64f0c2",
            "quotationNumber": "CE0016-21-22",
            "quotationDate": "2021-06-10T00:00:00.000Z",
            "billTo": { "name": "Asha Traders", "city": "Pune" },
            "items": [{ "description": "Sofa", "price": 170, "quantity": 4 }],
            "subtotal": 680,
            "cgstPercent": 9,
            "cgstAmount": 61.199999999999996,
            "sgstAmount": 61.199999999999996,
            "grandTotal": 802.4,
            "createdAt": "2021-06-10T08:30:00.000Z"
        }));

        let (number, new) = prepare(&record).unwrap();
        assert_eq!(number.sequence, 16);
        assert_eq!(new.number, "CE0016-21-22");
        assert_eq!(new.rates, GstRates::standard());

        let totals = new.totals.complete().unwrap();
        assert_eq!(totals.cgst_amount, Money::from_paise(6120));
        assert_eq!(totals.grand_total, Money::from_paise(80240));
        assert_eq!(new.created_at.to_rfc3339(), "2021-06-10T08:30:00+00:00");
    }

    #[test]
    fn test_prepare_keeps_each_present_total() {
        let record = legacy(serde_json::json!({
            "quotationNumber": "CE0002-20-21",
            "quotationDate": "2020-05-01",
            "items": [{ "description": "Sofa", "price": 170, "quantity": 4 }],
            "subtotal": 680,
            "cgstAmount": 61.2,
            "grandTotal": 741.2
        }));

        let (_, new) = prepare(&record).unwrap();
        assert_eq!(new.totals.subtotal, Some(Money::from_paise(68000)));
        assert_eq!(new.totals.cgst_amount, Some(Money::from_paise(6120)));
        assert_eq!(new.totals.sgst_amount, None);
        assert_eq!(new.totals.grand_total, Some(Money::from_paise(74120)));
    }

    #[test]
    fn test_prepare_without_totals() {
        let record = legacy(serde_json::json!({
            "quotationNumber": "CE0002-20-21",
            "quotationDate": "2020-05-01",
            "items": [{ "description": "Chair", "price": "100", "quantity": 1 }]
        }));

        let (_, new) = prepare(&record).unwrap();
        assert!(new.totals.is_empty());
    }

    #[test]
    fn test_prepare_custom_percent() {
        let record = legacy(serde_json::json!({
            "quotationNumber": "CE0003-20-21",
            "quotationDate": "2020-05-01",
            "items": [{ "description": "Chair", "price": "100", "quantity": 1 }],
            "cgstPercent": 2.5
        }));

        let (_, new) = prepare(&record).unwrap();
        assert_eq!(new.rates.cgst, TaxRate::from_bps(250));
        assert_eq!(new.rates.sgst, TaxRate::from_bps(250));
    }

    #[test]
    fn test_prepare_rejects_bad_records() {
        let bad_number = legacy(serde_json::json!({
            "quotationNumber": "Q-16",
            "quotationDate": "2020-05-01",
            "items": [{ "description": "Chair", "price": "100", "quantity": 1 }]
        }));
        assert!(prepare(&bad_number).is_err());

        let no_items = legacy(serde_json::json!({
            "quotationNumber": "CE0004-20-21",
            "quotationDate": "2020-05-01"
        }));
        assert!(prepare(&no_items).is_err());

        let bad_percent = legacy(serde_json::json!({
            "quotationNumber": "CE0005-20-21",
            "quotationDate": "2020-05-01",
            "items": [{ "description": "Chair", "price": "100", "quantity": 1 }],
            "cgstPercent": 250
        }));
        assert!(prepare(&bad_percent).is_err());
    }
}
