//! # furnisure-db: Database Layer for Furnisure Quotations
//!
//! This crate provides durable storage for quotation numbering and
//! quotation records. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Furnisure Data Flow                                 │
//! │                                                                         │
//! │  create_quotation command                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   furnisure-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ SequenceCounter│   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Quotation      │   │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     furnisure.db (WAL)                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Counter and quotation repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use furnisure_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("furnisure.db")).await?;
//!
//! let seq = db.counters().next_value("quotation").await?;
//! let quotations = db.quotations().find_all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, Storage};

pub use repository::counter::SequenceCounterRepository;
pub use repository::quotation::{
    NewQuotation, QuotationChanges, QuotationRepository, NUMBER_COLUMN,
};
