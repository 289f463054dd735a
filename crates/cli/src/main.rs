//! Orderflow CLI - Session migrations and formatter checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the staff session schema and table
//! of-cli migrate sessions
//!
//! # Check how amounts and dates render for a locale
//! of-cli format currency 123456.78 --locale en-US --currency USD
//! of-cli format date 2024-01-05
//! of-cli format datetime 2024-01-05T14:30:00+05:30 --locale en-GB
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `format` - Print formatter output

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use orderflow_core::{CurrencyCode, Locale};

mod commands;

#[derive(Parser)]
#[command(name = "of-cli")]
#[command(author, version, about = "Orderflow staff panel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Print what the panel's formatters produce
    Format {
        #[command(subcommand)]
        kind: FormatKind,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the staff session schema and table
    Sessions,
}

#[derive(Subcommand)]
enum FormatKind {
    /// Format an amount of money
    Currency {
        /// Amount, e.g. `1234.5`
        amount: String,

        /// ISO 4217 code (`INR`, `USD`, `EUR`, `GBP`)
        #[arg(short, long)]
        currency: Option<CurrencyCode>,

        /// Display locale (`en-IN`, `en-US`, `en-GB`)
        #[arg(short, long)]
        locale: Option<Locale>,
    },
    /// Format a date
    Date {
        /// Date text, or milliseconds since the Unix epoch
        value: String,

        /// Display locale (`en-IN`, `en-US`, `en-GB`)
        #[arg(short, long)]
        locale: Option<Locale>,
    },
    /// Format a date with hour and minute
    Datetime {
        /// Date-time text, or milliseconds since the Unix epoch
        value: String,

        /// Display locale (`en-IN`, `en-US`, `en-GB`)
        #[arg(short, long)]
        locale: Option<Locale>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Format { kind } => match kind {
            FormatKind::Currency {
                amount,
                currency,
                locale,
            } => commands::format::currency(&amount, currency, locale),
            FormatKind::Date { value, locale } => commands::format::date(&value, locale),
            FormatKind::Datetime { value, locale } => commands::format::date_time(&value, locale),
        },
    }
    Ok(())
}
