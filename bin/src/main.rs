//! Fundi CLI binary.
//!
//! Provides a command-line interface for sector screening and peer comparison.

mod cmd;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use logging::LogFormat;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "fundi")]
#[command(about = "Fundamental screening and peer comparison for equities", long_about = None)]
#[command(version)]
struct Cli {
    /// Read fundamentals from a JSON fixture instead of FMP
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Log filter (e.g. `info`, `fundi_screen=debug`); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human readable tables
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a sector against fundamental criteria
    Screen {
        /// Sector name (e.g. technology, "health care")
        sector: String,

        /// Rule expression, e.g. "pe_ratio <= 15" (repeatable)
        #[arg(short, long = "rule")]
        rules: Vec<String>,

        /// Threshold as key=value, e.g. max_pe_ratio=15 (repeatable)
        #[arg(short, long = "threshold")]
        thresholds: Vec<String>,

        /// Criteria file (JSON or TOML)
        #[arg(short, long)]
        criteria: Option<PathBuf>,

        /// Start from the small-cap value preset
        #[arg(long)]
        small_caps: bool,

        /// Score weight as metric=weight (repeatable)
        #[arg(short, long = "weight")]
        weights: Vec<String>,

        /// Screen these tickers instead of the sector listing
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Also list companies that failed a rule
        #[arg(long)]
        include_failures: bool,

        /// Show only the top N results
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Concurrent fetches
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Overall deadline in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Do not retry transient network errors
        #[arg(long)]
        no_retry: bool,

        /// Only use ratios the provider reports; never derive them from statements
        #[arg(long)]
        no_derive: bool,

        /// Flag records older than this many days as stale
        #[arg(long)]
        max_age: Option<i64>,

        /// Reference date for staleness (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compare companies metric by metric
    Compare {
        /// Ticker symbols
        #[arg(required = true, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Restrict the table to these metrics
        #[arg(short, long, value_delimiter = ',')]
        metrics: Vec<String>,

        /// Append sector-style aggregates
        #[arg(short, long)]
        summary: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List canonical metrics
    Metrics {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.log_format)?;

    match cli.command {
        Commands::Screen {
            sector,
            rules,
            thresholds,
            criteria,
            small_caps,
            weights,
            tickers,
            include_failures,
            top,
            concurrency,
            timeout,
            no_retry,
            no_derive,
            max_age,
            as_of,
            format,
        } => {
            let args = cmd::screen::ScreenArgs {
                sector,
                sources: config::CriteriaSources {
                    file: criteria.as_deref(),
                    thresholds: &thresholds,
                    rules: &rules,
                    weights: &weights,
                    small_caps,
                },
                tickers,
                include_failures,
                top,
                concurrency,
                timeout,
                retry: !no_retry,
                derive_ratios: !no_derive,
                max_age,
                as_of,
                format,
            };
            cmd::screen::run(cli.data.as_deref(), args).await?;
        }
        Commands::Compare {
            tickers,
            metrics,
            summary,
            format,
        } => {
            cmd::compare::run(cli.data.as_deref(), &tickers, &metrics, summary, format).await?;
        }
        Commands::Metrics { category, verbose } => {
            cmd::metrics::run(category.as_deref(), verbose)?;
        }
    }

    Ok(())
}
