//! # Repository Module
//!
//! Database repository implementations for Furnisure quotations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Command layer                                                         │
//! │       │                                                                 │
//! │       │  db.counters().next_value("quotation")                         │
//! │       │  db.quotations().insert(new_quotation)                         │
//! │       ▼                                                                 │
//! │  SequenceCounterRepository        QuotationRepository                  │
//! │  ├── next_value(name)             ├── insert(new)                      │
//! │  ├── current_value(name)          ├── find_all() / find_by_id(id)      │
//! │  └── advance_to(name, floor)      ├── update(id, changes)              │
//! │                                   └── delete(id) / count()             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SequenceCounterRepository`](counter::SequenceCounterRepository) - Durable named counters
//! - [`QuotationRepository`](quotation::QuotationRepository) - Quotation CRUD

pub mod counter;
pub mod quotation;
