//! Compare command implementation.

use super::{format_value, print_header, print_section};
use crate::OutputFormat;
use crate::config;
use anyhow::{Result, bail};
use fundi_compare::{ComparisonAggregator, ComparisonTable, SectorSummary};
use fundi_criteria::CriteriaSet;
use fundi_screen::{ScreenerConfig, SectorScreener};
use fundi_traits::{CanonicalMetrics, Metric, Symbol};
use serde_json::json;
use std::path::Path;

/// Fetch the tickers and print the peer comparison.
pub(crate) async fn run(
    data: Option<&Path>,
    tickers: &[String],
    metrics: &[String],
    summary: bool,
    format: OutputFormat,
) -> Result<()> {
    let selected: Vec<Metric> = metrics
        .iter()
        .map(|m| m.parse())
        .collect::<fundi_traits::Result<_>>()?;
    let tickers: Vec<Symbol> = tickers.iter().map(|t| t.trim().to_uppercase()).collect();

    let provider = config::load_provider(data)?;
    let screener = SectorScreener::with_config(provider, ScreenerConfig::default());
    let report = screener
        .screen_tickers("Peers", &tickers, &CriteriaSet::default())
        .await;

    for unresolved in &report.unresolved {
        eprintln!("Warning: {} {} ({})", unresolved.ticker, unresolved.reason, unresolved.message);
    }
    let records = in_input_order(&tickers, report.evaluated().map(|r| &r.metrics));
    if records.is_empty() {
        bail!("none of the requested tickers could be resolved");
    }

    let table = ComparisonAggregator::new().compare(&records);
    let columns: Vec<Metric> = table
        .metrics()
        .iter()
        .copied()
        .filter(|m| selected.is_empty() || selected.contains(m))
        .collect();
    let sector_summary = summary.then(|| SectorSummary::from_records(None, &records));

    match format {
        OutputFormat::Json => {
            let rows: serde_json::Map<String, serde_json::Value> = table
                .tickers()
                .iter()
                .map(|ticker| {
                    let row: serde_json::Map<String, serde_json::Value> = columns
                        .iter()
                        .filter_map(|m| {
                            table
                                .get(ticker, *m)
                                .map(|c| (m.as_str().to_string(), json!(c)))
                        })
                        .collect();
                    (ticker.clone(), serde_json::Value::Object(row))
                })
                .collect();
            let output = json!({
                "tickers": table.tickers(),
                "metrics": columns,
                "rows": rows,
                "summary": sector_summary,
                "unresolved": report.unresolved,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            print_table(&table, &columns);
            if let Some(summary) = &sector_summary {
                print_summary(summary, &columns);
            }
        }
    }
    Ok(())
}

/// Records in the order the tickers were requested, first occurrence only.
fn in_input_order<'a>(
    tickers: &[Symbol],
    evaluated: impl Iterator<Item = &'a CanonicalMetrics>,
) -> Vec<CanonicalMetrics> {
    let evaluated: Vec<&CanonicalMetrics> = evaluated.collect();
    let mut records: Vec<CanonicalMetrics> = Vec::new();
    for ticker in tickers {
        if records.iter().any(|r| r.ticker() == ticker) {
            continue;
        }
        if let Some(record) = evaluated.iter().find(|r| r.ticker() == ticker) {
            records.push((*record).clone());
        }
    }
    records
}

fn print_table(table: &ComparisonTable, columns: &[Metric]) {
    print_header("Peer Comparison");
    print_section("VALUE (RANK)");

    let mut header = format!("{:<16}", "Metric");
    for ticker in table.tickers() {
        header.push_str(&format!(" {ticker:>16}"));
    }
    println!("{header}");
    println!("{}", "-".repeat(header.chars().count()));

    for metric in columns {
        let mut line = format!("{:<16}", metric.label());
        for ticker in table.tickers() {
            let cell = table.get(ticker, *metric).map_or_else(
                || "-".to_string(),
                |c| format!("{} (#{})", format_value(*metric, c.value), c.rank),
            );
            line.push_str(&format!(" {cell:>16}"));
        }
        println!("{line}");
    }
    println!();
}

fn print_summary(summary: &SectorSummary, columns: &[Metric]) {
    print_section("SUMMARY");
    println!("Companies:  {}", summary.company_count);
    println!();
    println!("{:<16} {:>6} {:>14} {:>14}", "Metric", "Count", "Mean", "Median");
    println!("{}", "-".repeat(53));
    for metric in columns {
        if let Some(agg) = summary.metric(*metric) {
            println!(
                "{:<16} {:>6} {:>14} {:>14}",
                metric.label(),
                agg.count,
                format_value(*metric, agg.mean),
                format_value(*metric, agg.median)
            );
        }
    }
    println!();
    if summary.undervalued.is_empty() {
        println!("No company trades below the median P/E with above-median ROE.");
    } else {
        println!(
            "Below-median P/E with above-median ROE: {}",
            summary.undervalued.join(", ")
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_input_order() {
        let evaluated = [
            CanonicalMetrics::from_values("AAA", [(Metric::PeRatio, 10.0)]),
            CanonicalMetrics::from_values("BBB", [(Metric::PeRatio, 20.0)]),
        ];
        let tickers: Vec<Symbol> = vec!["BBB".into(), "ZZZ".into(), "AAA".into(), "BBB".into()];
        let records = in_input_order(&tickers, evaluated.iter());
        let order: Vec<&str> = records.iter().map(CanonicalMetrics::ticker).collect();
        assert_eq!(order, vec!["BBB", "AAA"]);
    }
}
