//! # Quotation Commands
//!
//! Creation, update, retrieval and rendering of quotations.
//!
//! ## Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_quotation                                     │
//! │                                                                         │
//! │  QuotationInput                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_quotation_input ──── ValidationError ──► stop, nothing used  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_totals(items, configured rates)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  supplied totals == computed? ── no ──► TotalsMismatch, nothing used   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  counters.next_value ────────── error ──► COUNTER_UNAVAILABLE          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  assign_number(date, seq)       e.g. CE0016-21-22                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  quotations.insert ──────────── UNIQUE ──► DUPLICATE_NUMBER            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Quotation (number fixed for life)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A counter value taken before a failed insert is not reused; the
//! numbering gets a gap, never a duplicate.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use furnisure_core::validation::{validate_quotation_input, validate_uuid};
use furnisure_core::{
    assign_number_with_prefix, compute_totals, DocumentNumber, Money, PrintableQuotation,
    Quotation, QuotationInput, TotalsSource,
};
use furnisure_db::{DbError, NewQuotation, QuotationChanges, NUMBER_COLUMN};

use crate::error::ApiError;
use crate::state::AppState;

/// One row of the quotation list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationSummary {
    pub id: String,
    pub number: String,
    /// `#0016`, or the full number if it doesn't parse.
    pub label: String,
    pub date: NaiveDate,
    pub customer: String,
    pub grand_total: Option<Money>,
}

impl From<&Quotation> for QuotationSummary {
    fn from(q: &Quotation) -> Self {
        let label = DocumentNumber::parse(&q.number)
            .map(|n| n.short_label())
            .unwrap_or_else(|_| q.number.clone());

        QuotationSummary {
            id: q.id.clone(),
            number: q.number.clone(),
            label,
            date: q.date,
            customer: q.bill_to.name.clone(),
            grand_total: q.totals.grand_total,
        }
    }
}

/// What the next created quotation would be numbered, if nothing else
/// takes a number first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberPreview {
    pub number: String,
    pub sequence: u64,
}

// =============================================================================
// Commands
// =============================================================================

/// Validates, totals, numbers and stores a new quotation.
pub async fn create_quotation(
    state: &AppState,
    input: QuotationInput,
) -> Result<Quotation, ApiError> {
    debug!(items = input.items.len(), "create_quotation command");

    let draft = validate_quotation_input(&input)?;

    let rates = state.config().tax.rates();
    let totals = compute_totals(&draft.items, rates)?;
    totals.verify_claimed(&draft.claimed)?;

    let sequence = next_sequence(state).await?;
    let number = assign_number_with_prefix(&state.config().numbering.prefix, draft.date, sequence);

    let quotation = state
        .db()
        .quotations()
        .insert(NewQuotation {
            number: number.clone(),
            date: draft.date,
            bill_to: draft.bill_to,
            items: draft.items,
            rates,
            totals: totals.into(),
            created_at: Utc::now(),
        })
        .await
        .map_err(|e| number_conflict(e, &number))?;

    info!(
        id = %quotation.id,
        number = %quotation.number,
        grand_total = %totals.grand_total,
        "Quotation created"
    );

    Ok(quotation)
}

/// Replaces date, bill-to and items of quotation `id`.
///
/// Totals are recomputed with the rates stored on the record. The number
/// is never recomputed, even if the new date falls in another fiscal year.
pub async fn update_quotation(
    state: &AppState,
    id: &str,
    input: QuotationInput,
) -> Result<Quotation, ApiError> {
    debug!(id = %id, "update_quotation command");

    let existing = get_quotation(state, id).await?;

    let draft = validate_quotation_input(&input)?;
    let totals = compute_totals(&draft.items, existing.rates)?;
    totals.verify_claimed(&draft.claimed)?;

    let updated = state
        .db()
        .quotations()
        .update(
            id,
            QuotationChanges {
                date: draft.date,
                bill_to: draft.bill_to,
                items: draft.items,
                totals,
            },
        )
        .await?;

    info!(id = %id, number = %updated.number, "Quotation updated");
    Ok(updated)
}

/// All quotations, newest first.
pub async fn list_quotations(state: &AppState) -> Result<Vec<QuotationSummary>, ApiError> {
    debug!("list_quotations command");

    let quotations = state.db().quotations().find_all().await?;
    Ok(quotations.iter().map(QuotationSummary::from).collect())
}

pub async fn get_quotation(state: &AppState, id: &str) -> Result<Quotation, ApiError> {
    debug!(id = %id, "get_quotation command");

    validate_uuid(id).map_err(|_| ApiError::not_found("Quotation", id))?;

    state
        .db()
        .quotations()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Quotation", id))
}

pub async fn delete_quotation(state: &AppState, id: &str) -> Result<(), ApiError> {
    debug!(id = %id, "delete_quotation command");

    if !state.db().quotations().delete(id).await? {
        return Err(ApiError::not_found("Quotation", id));
    }

    info!(id = %id, "Quotation deleted");
    Ok(())
}

/// Lays out quotation `id` for printing.
///
/// Stored totals are used as they are. Amounts a record lacks are
/// recomputed with its own rates, and the fallback is logged.
pub async fn render_quotation(state: &AppState, id: &str) -> Result<PrintableQuotation, ApiError> {
    debug!(id = %id, "render_quotation command");

    let quotation = get_quotation(state, id).await?;
    let page = PrintableQuotation::build(&quotation, &state.config().company)?;

    if page.totals_source != TotalsSource::Stored {
        warn!(
            id = %quotation.id,
            number = %quotation.number,
            source = ?page.totals_source,
            "Quotation is missing stored totals; rendering recomputed amounts"
        );
    }

    Ok(page)
}

/// Previews the number the next created quotation would receive.
///
/// Read-only: nothing is reserved, a concurrent creation may take it.
pub async fn peek_next_number(
    state: &AppState,
    date: Option<NaiveDate>,
) -> Result<NumberPreview, ApiError> {
    let counter = &state.config().numbering.counter_name;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let current = state
        .db()
        .counters()
        .current_value(counter)
        .await
        .map_err(|e| ApiError::counter_unavailable(counter, e))?
        .unwrap_or(0);

    let sequence = counter_value_to_sequence(current)?.saturating_add(1);

    Ok(NumberPreview {
        number: assign_number_with_prefix(&state.config().numbering.prefix, date, sequence),
        sequence,
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// Takes the next value of the configured counter.
async fn next_sequence(state: &AppState) -> Result<u64, ApiError> {
    let counter = &state.config().numbering.counter_name;

    let value = state
        .db()
        .counters()
        .next_value(counter)
        .await
        .map_err(|e| ApiError::counter_unavailable(counter, e))?;

    counter_value_to_sequence(value)
}

fn counter_value_to_sequence(value: i64) -> Result<u64, ApiError> {
    u64::try_from(value)
        .map_err(|_| ApiError::internal(format!("Counter holds a negative value: {}", value)))
}

/// Maps a failed insert, escalating a number collision.
pub(crate) fn number_conflict(err: DbError, number: &str) -> ApiError {
    if err.is_unique_violation_on(NUMBER_COLUMN) {
        ApiError::duplicate_number(number)
    } else {
        err.into()
    }
}
