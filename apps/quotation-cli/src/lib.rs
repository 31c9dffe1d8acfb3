//! # Furnisure Quotations
//!
//! Quotation numbering, totals and storage behind the `quotations` binary.
//!
//! ## Module Organization
//! ```text
//! furnisure_quotations/
//! ├── lib.rs          ◄─── You are here (module exports, logging setup)
//! ├── config.rs       ◄─── furnisure.toml + FURNISURE_* overrides
//! ├── state.rs        ◄─── Database + configuration handle
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── quotation.rs◄─── Create/update/list/show/delete/render/peek
//! │   └── import.rs   ◄─── Legacy record import
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Where Things Happen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  furnisure-core     pure: validation, totals, fiscal-year numbering,   │
//! │                     print layout. No I/O.                              │
//! │                                                                         │
//! │  furnisure-db       SQLite: the sequence counter and quotation rows.   │
//! │                                                                         │
//! │  this crate         wires them: one shared totals path for create,     │
//! │                     update and render; error codes; logging.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=furnisure=trace` - Show trace for furnisure crates only
/// - Default: INFO, DEBUG for furnisure crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,furnisure=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
