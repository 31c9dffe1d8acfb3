//! # Validation Module
//!
//! Input validation for quotation requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Quotation form                                               │
//! │  ├── Basic format checks (date picker, number inputs)                  │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command layer (Rust)                                         │
//! │  ├── Type validation (deserialization into QuotationInput)             │
//! │  └── THIS MODULE: QuotationInput → QuotationDraft                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (number)                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use furnisure_core::validation::{validate_description, validate_quantity};
//!
//! validate_description("Teak wood dining chair").unwrap();
//! validate_quantity(4).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::{DateTime, NaiveDate};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    AmountInput, BillTo, ClaimedTotals, LineItem, LineItemInput, QuotationDraft, QuotationInput,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Longest accepted bill-to field.
pub const MAX_BILL_TO_FIELD_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item description.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_DESCRIPTION_LEN`] characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates the bill-to block. Every field is optional; lengths are capped.
pub fn validate_bill_to(bill_to: &BillTo) -> ValidationResult<()> {
    let fields = [
        ("billTo.name", &bill_to.name),
        ("billTo.address", &bill_to.address),
        ("billTo.city", &bill_to.city),
        ("billTo.mobile", &bill_to.mobile),
    ];

    for (field, value) in fields {
        if value.chars().count() > MAX_BILL_TO_FIELD_LEN {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_BILL_TO_FIELD_LEN,
            });
        }
    }

    Ok(())
}

/// Parses the quotation date.
///
/// ## Accepted Forms
/// - `2021-05-03` (date input)
/// - `2021-05-03T00:00:00.000Z` (ISO timestamp as stored by the legacy app);
///   the calendar date is taken as written, no timezone shift is applied
///
/// ## Example
/// ```rust
/// use furnisure_core::validation::parse_quotation_date;
///
/// assert!(parse_quotation_date(Some("2021-05-03")).is_ok());
/// assert!(parse_quotation_date(Some("2021-05-03T00:00:00.000Z")).is_ok());
/// assert!(parse_quotation_date(Some("03/05/2021")).is_err());
/// assert!(parse_quotation_date(None).is_err());
/// ```
pub fn parse_quotation_date(raw: Option<&str>) -> ValidationResult<NaiveDate> {
    let raw = raw.map(str::trim).unwrap_or_default();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "quotationDate".to_string(),
        });
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quotationDate".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Parses a submitted quantity: a positive whole number, given as a JSON
/// number or a string.
pub fn parse_quantity(input: &AmountInput) -> ValidationResult<i64> {
    let text = input.as_decimal_text();
    let quantity = text
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a whole number", text.trim()),
        })?;
    validate_quantity(quantity)?;

    Ok(quantity)
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items)
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates one submitted line item.
pub fn validate_line_item(input: &LineItemInput) -> ValidationResult<LineItem> {
    line_item_with(input, Money::parse_decimal)
}

/// Validates a line item taken from an already stored record.
///
/// Same rules as [`validate_line_item`], except that prices with more than
/// two decimal places (binary float residue such as `169.99999999999997`)
/// are rounded half-up to the paisa instead of rejected.
pub fn validate_stored_line_item(input: &LineItemInput) -> ValidationResult<LineItem> {
    line_item_with(input, Money::parse_decimal_rounded)
}

fn line_item_with(
    input: &LineItemInput,
    parse: fn(&str) -> ValidationResult<Money>,
) -> ValidationResult<LineItem> {
    let description = input.description.as_deref().unwrap_or_default();
    validate_description(description)?;

    let price_input = input.price.as_ref().ok_or_else(|| ValidationError::Required {
        field: "price".to_string(),
    })?;
    let unit_price = parse_amount_with("price", price_input, parse)?;
    validate_unit_price(unit_price)?;

    let quantity_input = input.quantity.as_ref().ok_or_else(|| ValidationError::Required {
        field: "quantity".to_string(),
    })?;
    let quantity = parse_quantity(quantity_input)?;

    Ok(LineItem {
        description: description.trim().to_string(),
        unit_price,
        quantity,
    })
}

/// Validates a whole create/update request.
///
/// ## Rules
/// - `quotationDate` present and parseable
/// - at least one item; every item valid (errors name the item index)
/// - bill-to fields within length limits
/// - supplied totals, if any, are well-formed amounts (they are compared
///   to the computed totals later, once the rates are known)
pub fn validate_quotation_input(input: &QuotationInput) -> ValidationResult<QuotationDraft> {
    let date = parse_quotation_date(input.quotation_date.as_deref())?;

    if input.items.is_empty() {
        return Err(ValidationError::NoItems);
    }

    let items = input
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_line_item(item).map_err(|e| e.for_item(index)))
        .collect::<ValidationResult<Vec<_>>>()?;

    validate_bill_to(&input.bill_to)?;

    let claimed = ClaimedTotals {
        subtotal: parse_optional_amount("subtotal", input.subtotal.as_ref())?,
        cgst_amount: parse_optional_amount("cgstAmount", input.cgst_amount.as_ref())?,
        sgst_amount: parse_optional_amount("sgstAmount", input.sgst_amount.as_ref())?,
        grand_total: parse_optional_amount("grandTotal", input.grand_total.as_ref())?,
    };

    Ok(QuotationDraft {
        date,
        bill_to: normalize_bill_to(&input.bill_to),
        items,
        claimed,
    })
}

/// Bill-to details with surrounding whitespace removed.
pub fn normalize_bill_to(bill_to: &BillTo) -> BillTo {
    BillTo {
        name: bill_to.name.trim().to_string(),
        address: bill_to.address.trim().to_string(),
        city: bill_to.city.trim().to_string(),
        mobile: bill_to.mobile.trim().to_string(),
    }
}

/// Parses a stored amount, rounding half-up to the paisa. The error names
/// `field`.
pub fn parse_stored_amount(field: &str, amount: &AmountInput) -> ValidationResult<Money> {
    parse_amount_with(field, amount, Money::parse_decimal_rounded)
}

fn parse_amount(field: &str, amount: &AmountInput) -> ValidationResult<Money> {
    parse_amount_with(field, amount, Money::parse_decimal)
}

fn parse_amount_with(
    field: &str,
    amount: &AmountInput,
    parse: fn(&str) -> ValidationResult<Money>,
) -> ValidationResult<Money> {
    parse(&amount.as_decimal_text()).map_err(|e| match e {
        ValidationError::InvalidFormat { reason, .. } => ValidationError::InvalidFormat {
            field: field.to_string(),
            reason,
        },
        other => other,
    })
}

fn parse_optional_amount(
    field: &str,
    amount: Option<&AmountInput>,
) -> ValidationResult<Option<Money>> {
    amount.map(|a| parse_amount(field, a)).transpose()
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use furnisure_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: &str, price: &str, quantity: i64) -> LineItemInput {
        LineItemInput {
            description: Some(description.to_string()),
            price: Some(AmountInput::Text(price.to_string())),
            quantity: Some(AmountInput::Number(quantity.into())),
        }
    }

    fn input(items: Vec<LineItemInput>) -> QuotationInput {
        QuotationInput {
            quotation_date: Some("2021-05-03".to_string()),
            items,
            ..QuotationInput::default()
        }
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Recliner sofa").is_ok());
        assert!(validate_description("").is_err());
        assert!(validate_description("   ").is_err());
        assert!(validate_description(&"A".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from_paise(17000)).is_ok());
        assert!(validate_unit_price(Money::from_paise(-1)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(900).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_parse_quotation_date() {
        let expected = NaiveDate::from_ymd_opt(2021, 5, 3).unwrap();
        assert_eq!(parse_quotation_date(Some("2021-05-03")).unwrap(), expected);
        assert_eq!(
            parse_quotation_date(Some("2021-05-03T00:00:00.000Z")).unwrap(),
            expected
        );
        assert_eq!(
            parse_quotation_date(Some("")).unwrap_err(),
            ValidationError::Required {
                field: "quotationDate".to_string()
            }
        );
        assert!(parse_quotation_date(Some("2021-02-30")).is_err());
    }

    #[test]
    fn test_valid_input_becomes_draft() {
        let mut request = input(vec![item("  Dining chair ", "170.00", 4)]);
        request.grand_total = Some(AmountInput::Text("802.40".to_string()));
        request.bill_to.name = " Shantinath Agency ".to_string();

        let draft = validate_quotation_input(&request).unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2021, 5, 3).unwrap());
        assert_eq!(draft.items[0].description, "Dining chair");
        assert_eq!(draft.items[0].unit_price, Money::from_paise(17000));
        assert_eq!(draft.bill_to.name, "Shantinath Agency");
        assert_eq!(draft.claimed.grand_total, Some(Money::from_paise(80240)));
        assert_eq!(draft.claimed.subtotal, None);
    }

    #[test]
    fn test_empty_items_rejected() {
        assert_eq!(
            validate_quotation_input(&input(vec![])).unwrap_err(),
            ValidationError::NoItems
        );
    }

    #[test]
    fn test_missing_date_rejected() {
        let mut request = input(vec![item("Chair", "1", 1)]);
        request.quotation_date = None;
        assert!(matches!(
            validate_quotation_input(&request),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_bad_item_reports_index() {
        let request = input(vec![item("Chair", "1", 1), item("Table", "-5", 1)]);
        assert_eq!(
            validate_quotation_input(&request).unwrap_err(),
            ValidationError::Negative {
                field: "items[1].price".to_string()
            }
        );

        let request = input(vec![item("Chair", "1", 0)]);
        assert_eq!(
            validate_quotation_input(&request).unwrap_err(),
            ValidationError::MustBePositive {
                field: "items[0].quantity".to_string()
            }
        );

        let request = input(vec![LineItemInput::default()]);
        assert_eq!(
            validate_quotation_input(&request).unwrap_err(),
            ValidationError::Required {
                field: "items[0].description".to_string()
            }
        );
    }

    #[test]
    fn test_quantity_forms() {
        assert_eq!(parse_quantity(&AmountInput::Number(4.into())).unwrap(), 4);
        assert_eq!(parse_quantity(&AmountInput::Text(" 4 ".into())).unwrap(), 4);
        assert!(matches!(
            parse_quantity(&AmountInput::Text("-2".into())),
            Err(ValidationError::MustBePositive { .. })
        ));

        // A fractional quantity arrives as a request, not a decode failure
        let request: QuotationInput = serde_json::from_str(
            r#"{
                "quotationDate": "2021-05-03",
                "items": [{ "description": "Chair", "price": "10", "quantity": 4.5 }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            validate_quotation_input(&request),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "items[0].quantity"
        ));
    }

    #[test]
    fn test_float_claimed_total_is_format_error() {
        let mut request = input(vec![item("Chair", "170", 4)]);
        request.cgst_amount = Some(AmountInput::Text("61.199999999999996".to_string()));
        assert!(matches!(
            validate_quotation_input(&request),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "cgstAmount"
        ));
    }

    #[test]
    fn test_stored_line_item_rounds_float_residue() {
        let stored = item("Sofa", "169.99999999999997", 2);
        assert!(validate_line_item(&stored).is_err());

        let line = validate_stored_line_item(&stored).unwrap();
        assert_eq!(line.unit_price, Money::from_paise(17000));
        assert_eq!(line.quantity, 2);

        assert!(validate_stored_line_item(&item("Sofa", "-1", 1)).is_err());
    }

    #[test]
    fn test_parse_stored_amount_names_field() {
        let amount = parse_stored_amount("grandTotal", &AmountInput::Text("802.4".into())).unwrap();
        assert_eq!(amount, Money::from_paise(80240));

        assert!(matches!(
            parse_stored_amount("grandTotal", &AmountInput::Text("abc".into())),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "grandTotal"
        ));
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
