//! Screen command implementation.

use super::{format_opt, print_header, print_section};
use crate::OutputFormat;
use crate::config::{self, CriteriaSources};
use anyhow::Result;
use fundi_criteria::CriteriaSet;
use fundi_metrics::{FundamentalsNormalizer, NormalizerConfig};
use fundi_screen::{ScreenerConfig, ScreeningReport, ScreeningResult, SectorScreener, normalize_sector_name};
use fundi_traits::{Metric, Symbol};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Parsed `screen` arguments.
pub(crate) struct ScreenArgs<'a> {
    pub(crate) sector: String,
    pub(crate) sources: CriteriaSources<'a>,
    pub(crate) tickers: Vec<String>,
    pub(crate) include_failures: bool,
    pub(crate) top: Option<usize>,
    pub(crate) concurrency: usize,
    pub(crate) timeout: Option<u64>,
    pub(crate) retry: bool,
    pub(crate) derive_ratios: bool,
    pub(crate) max_age: Option<i64>,
    pub(crate) as_of: Option<String>,
    pub(crate) format: OutputFormat,
}

/// Screen a sector and print the ranked report.
pub(crate) async fn run(data: Option<&Path>, args: ScreenArgs<'_>) -> Result<()> {
    // Criteria errors surface before any network access
    let (rules, weights) = config::build_criteria(&args.sources)?;
    let reference_date = args.as_of.as_deref().map(config::parse_date).transpose()?;

    let screener_config = ScreenerConfig {
        include_failures: args.include_failures,
        concurrency: args.concurrency,
        timeout: args.timeout.map(Duration::from_secs),
        retry_transient: args.retry,
        weights,
        max_record_age_days: args.max_age,
        reference_date,
    };
    let provider = config::load_provider(data)?;
    let normalizer = FundamentalsNormalizer::new(NormalizerConfig {
        derive_ratios: args.derive_ratios,
    });
    let screener = SectorScreener::with_config(provider, screener_config).with_normalizer(normalizer);

    let report = if args.tickers.is_empty() {
        screener.screen(&args.sector, &rules).await?
    } else {
        let tickers: Vec<Symbol> = args.tickers.iter().map(|t| t.trim().to_uppercase()).collect();
        let sector = normalize_sector_name(&args.sector);
        screener.screen_tickers(&sector, &tickers, &rules).await
    };

    match args.format {
        OutputFormat::Json => print_json(&report, args.top)?,
        OutputFormat::Text => print_text(&report, &rules, args.top),
    }
    Ok(())
}

fn limited(report: &ScreeningReport, top: Option<usize>) -> Vec<&ScreeningResult> {
    let mut ranked = report.ranked();
    if let Some(n) = top {
        ranked.truncate(n);
    }
    ranked
}

fn print_json(report: &ScreeningReport, top: Option<usize>) -> Result<()> {
    let output = json!({
        "sector": report.sector,
        "evaluated": report.evaluated_count(),
        "candidates": report.candidates.len(),
        "results": limited(report, top),
        "unresolved": report.unresolved,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(report: &ScreeningReport, rules: &CriteriaSet, top: Option<usize>) {
    print_header("Sector Screen");

    println!("Sector:     {}", report.sector);
    println!("Rules:");
    for rule in rules {
        println!("  {rule}");
    }
    println!("Evaluated:  {}", report.evaluated_count());
    println!("Passed:     {}", report.candidates.len());
    println!("Unresolved: {}", report.unresolved.len());
    println!();

    let rows = limited(report, top);
    if rows.is_empty() {
        println!("No companies matched the criteria.\n");
    } else {
        let columns: Vec<Metric> = rules.metrics().into_iter().collect();
        print_section("RANKED RESULTS");

        let mut header = format!("{:>4}  {:<8} {:>7}  {:<6}", "Rank", "Ticker", "Score", "Cap");
        for metric in &columns {
            header.push_str(&format!(" {:>14}", metric.label()));
        }
        header.push_str("  Status");
        println!("{header}");
        println!("{}", "-".repeat(header.chars().count()));

        for (i, result) in rows.iter().enumerate() {
            let cap = result
                .cap_bucket
                .map_or_else(|| "-".to_string(), |b| b.to_string());
            let mut line = format!(
                "{:>4}  {:<8} {:>7.3}  {:<6}",
                i + 1,
                result.ticker,
                result.score,
                cap
            );
            for metric in &columns {
                line.push_str(&format!(" {:>14}", format_opt(*metric, result.metrics.get(*metric))));
            }
            line.push_str(&format!("  {}", status(result)));
            println!("{line}");
        }
        println!();
    }

    if !report.unresolved.is_empty() {
        println!("Unresolved tickers:");
        for unresolved in &report.unresolved {
            println!(
                "  {:<8} {:<16} {}",
                unresolved.ticker, unresolved.reason, unresolved.message
            );
        }
        println!();
    }
}

fn status(result: &ScreeningResult) -> String {
    let mut status = if result.passed {
        "pass".to_string()
    } else {
        format!("fail: {}", result.failed_rules.join(", "))
    };
    if result.passed && !result.failed_rules.is_empty() {
        status.push_str(&format!(" (optional: {})", result.failed_rules.join(", ")));
    }
    if !result.skipped_rules.is_empty() {
        status.push_str(&format!(" [skipped: {}]", result.skipped_rules.join(", ")));
    }
    if result.stale {
        status.push_str(" [stale]");
    }
    status
}
