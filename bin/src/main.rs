//! isskit CLI - MOEX ISS market data and bond cashflow schedules.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use isskit_lib::prelude::*;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "isskit")]
#[command(about = "MOEX ISS market data and bond cashflow schedules", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// ISS endpoint root
    #[arg(long, global = true, default_value = isskit_lib::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the cashflow schedule of a bond
    Schedule {
        /// Security code (e.g., SU26238RMFS4)
        ticker: String,

        /// Redeem at the next offer and drop later payments
        #[arg(long)]
        till_offer: bool,

        /// Carry the last known coupon rate into future periods
        #[arg(long)]
        carry_coupon: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Output file path. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the coupon table of a bond
    Coupons {
        /// Security code
        ticker: String,
    },

    /// Show the primary board, market and engine of a security
    Board {
        /// Security code
        ticker: String,
    },

    /// Show the description and current market data of a security
    Info {
        /// Security code
        ticker: String,
    },

    /// Download daily trading history
    History {
        /// Security code
        ticker: String,

        /// Start date (YYYY-MM-DD). Defaults to 30 days before today
        #[arg(short, long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today
        #[arg(short, long)]
        end: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Output file path. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search traded securities
    Search {
        /// Search text (code, name or ISIN fragment)
        query: String,

        /// Restrict to one kind (share, bond, index, future)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Zero-coupon yield for a maturity in years
    Zyield {
        /// Maturity in years
        years: f64,

        /// Curve date (YYYY-MM-DD). Defaults to the latest curve
        #[arg(long)]
        date: Option<String>,
    },
}

/// Installs the log subscriber; `RUST_LOG` overrides the flag-derived level.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = ClientConfig {
        base_url: cli.base_url,
        timeout: Duration::from_secs(cli.timeout),
        ..ClientConfig::default()
    };
    let client = IssClient::new(config).context("Failed to create HTTP client")?;

    match command {
        Commands::Schedule {
            ticker,
            till_offer,
            carry_coupon,
            format,
            output,
        } => {
            let options = ScheduleOptions {
                truncate_at_next_offer: till_offer,
                carry_last_known_coupon: carry_coupon,
            };
            commands::schedule::schedule(&client, &ticker, options, format, output.as_deref())
                .await
        }
        Commands::Coupons { ticker } => commands::coupons::coupons(&client, &ticker).await,
        Commands::Board { ticker } => commands::board::board(&client, &ticker).await,
        Commands::Info { ticker } => commands::info::show_info(&client, &ticker).await,
        Commands::History {
            ticker,
            start,
            end,
            format,
            output,
        } => {
            commands::history::history(
                &client,
                &ticker,
                start.as_deref(),
                end.as_deref(),
                format,
                output.as_deref(),
            )
            .await
        }
        Commands::Search { query, kind } => {
            commands::search::search(&client, &query, kind.as_deref()).await
        }
        Commands::Zyield { years, date } => {
            commands::zyield::zyield(&client, years, date.as_deref()).await
        }
    }
}
