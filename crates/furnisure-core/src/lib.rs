//! # furnisure-core: Pure Business Logic for Furnisure Quotations
//!
//! This crate holds the rules every quotation path must agree on: how a
//! number is assigned, how totals are computed, what a valid request is.
//! Everything here is a pure function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Furnisure Quotations                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    quotations (CLI)                             │   │
//! │  │    create, update, list, show, delete, render, import          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ furnisure-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │  │  money  │ │ totals  │ │numbering │ │validation│ │ render │  │   │
//! │  │  │  Money  │ │ Totals  │ │FiscalYear│ │  draft   │ │  page  │  │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                furnisure-db (Database Layer)                    │   │
//! │  │        SQLite: sequence counter, quotation store               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Quotation, LineItem, TaxRate, etc.)
//! - [`money`] - Money type in paise (no floating point!)
//! - [`totals`] - The shared subtotal → CGST → SGST → grand total law
//! - [`numbering`] - Fiscal years and `CE0016-21-22` style numbers
//! - [`validation`] - Request validation
//! - [`render`] - Printable quotation layout
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use furnisure_core::{assign_number, compute_totals, GstRates, LineItem, Money};
//!
//! let date = NaiveDate::from_ymd_opt(2021, 5, 3).unwrap();
//! assert_eq!(assign_number(date, 16), "CE0016-21-22");
//!
//! let items = vec![LineItem {
//!     description: "Dining chair".to_string(),
//!     unit_price: Money::from_paise(17000),
//!     quantity: 4,
//! }];
//! let totals = compute_totals(&items, GstRates::standard()).unwrap();
//! assert_eq!(totals.grand_total.to_decimal_string(), "802.40");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod render;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use numbering::{assign_number, assign_number_with_prefix, DocumentNumber, FiscalYear};
pub use render::{PrintableQuotation, TotalsSource};
pub use totals::{compute_totals, GstRates, StoredTotals, Totals, CGST_RATE, SGST_RATE};
pub use types::*;
