//! # quotations
//!
//! ```text
//! quotations [--config furnisure.toml] <COMMAND>
//!
//!   create      --file q.json        number, total and store a quotation
//!   update <id> --file q.json        replace date, bill-to and items
//!   list                             all quotations, newest first
//!   show   <id>                      one quotation as JSON
//!   delete <id>
//!   render <id> [--json]             printable page
//!   import      --file export.json   load legacy records, keep numbers
//!   next-number [--date YYYY-MM-DD]  preview without reserving
//! ```
//!
//! Results are printed to stdout as JSON. A failed command prints its
//! `{ code, message }` error and exits with status 1.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use furnisure_core::QuotationInput;
use furnisure_quotations::commands::import::{import_legacy, LegacyQuotation};
use furnisure_quotations::commands::quotation::{
    create_quotation, delete_quotation, get_quotation, list_quotations, peek_next_number,
    render_quotation, update_quotation,
};
use furnisure_quotations::config::AppConfig;
use furnisure_quotations::error::ApiError;
use furnisure_quotations::init_tracing;
use furnisure_quotations::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "quotations", version, about = "Furnisure quotation book")]
struct Cli {
    /// Config file (default: platform config dir, then ./furnisure.toml)
    #[arg(long, global = true, env = "FURNISURE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a quotation from a JSON request
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Update a quotation; its number never changes
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// List quotations, newest first
    List,
    /// Show one quotation
    Show { id: String },
    /// Delete a quotation
    Delete { id: String },
    /// Render a quotation for printing
    Render {
        id: String,
        /// Print the layout as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Import quotations exported from the previous system
    Import {
        #[arg(long)]
        file: PathBuf,
    },
    /// Preview the next quotation number
    NextNumber {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config).context("failed to load configuration")?;
    let state = AppState::open(config)
        .await
        .context("failed to open the quotation database")?;

    let outcome = run(&state, cli.command).await;
    state.db().close().await;

    match outcome? {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Runs one command. The outer error is a local I/O or encoding problem,
/// the inner one a command failure to be reported as JSON.
async fn run(state: &AppState, command: Command) -> anyhow::Result<Result<(), ApiError>> {
    let result = match command {
        Command::Create { file } => {
            let input: QuotationInput = read_json(&file)?;
            create_quotation(state, input).await.map(|q| print_json(&q))
        }
        Command::Update { id, file } => {
            let input: QuotationInput = read_json(&file)?;
            update_quotation(state, &id, input).await.map(|q| print_json(&q))
        }
        Command::List => list_quotations(state).await.map(|list| print_json(&list)),
        Command::Show { id } => get_quotation(state, &id).await.map(|q| print_json(&q)),
        Command::Delete { id } => delete_quotation(state, &id).await.map(|()| {
            info!(id = %id, "Deleted");
            Ok(())
        }),
        Command::Render { id, json } => render_quotation(state, &id).await.map(|page| {
            if json {
                print_json(&page)
            } else {
                println!("{}", page);
                Ok(())
            }
        }),
        Command::Import { file } => {
            let records: Vec<LegacyQuotation> = read_json(&file)?;
            import_legacy(state, records).await.map(|report| print_json(&report))
        }
        Command::NextNumber { date } => peek_next_number(state, date)
            .await
            .map(|preview| print_json(&preview)),
    };

    // Surface a print failure, keep the command error
    match result {
        Ok(printed) => printed.map(Ok),
        Err(err) => Ok(Err(err)),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
