//! # Commands Module
//!
//! Every operation the `quotations` binary exposes.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── quotation.rs  ◄─── create, update, list, show, delete, render, next number
//! └── import.rs     ◄─── legacy record import
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  quotations create --file q.json                                       │
//! │         │                                                               │
//! │         │ (serde_json → QuotationInput)                                 │
//! │         ▼                                                               │
//! │  async fn create_quotation(                                            │
//! │      state: &AppState,       ◄── database + configuration              │
//! │      input: QuotationInput,  ◄── parsed request body                   │
//! │  ) -> Result<Quotation, ApiError>                                      │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  stdout: the stored quotation, or stderr: { code, message }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod import;
pub mod quotation;
