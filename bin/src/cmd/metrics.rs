//! Metrics command implementation.

use super::print_header;
use anyhow::{Result, bail};
use fundi_metrics::MetricCategory;
use fundi_metrics::registry::{available_categories, available_metrics, metrics_by_category};
use fundi_traits::Direction;

/// List canonical metrics, optionally filtered by category.
pub(crate) fn run(category: Option<&str>, verbose: bool) -> Result<()> {
    print_header("Available Metrics");

    let categories = match category {
        Some(name) => vec![parse_category(name)?],
        None => available_categories(),
    };

    for cat in categories {
        println!("{cat:?}:");
        if verbose {
            println!("  {}", cat.description());
        }
        println!("{}", "-".repeat(60));
        for info in metrics_by_category(&cat) {
            if verbose {
                let direction = match info.direction() {
                    Direction::HigherIsBetter => "higher is better",
                    Direction::LowerIsBetter => "lower is better",
                };
                let derived = if info.derivable { ", derivable" } else { "" };
                println!("  {:<18} {} ({direction}{derived})", info.metric.as_str(), info.description);
            } else {
                println!("  {}", info.metric.as_str());
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for descriptions and ranking direction.\n");
    }
    println!("Metric aliases:");
    println!("  pe, p/e, price_to_earnings  -> pe_ratio");
    println!("  pb, price_to_book           -> pb_ratio");
    println!("  mcap, market_capitalization -> market_cap");
    println!("  de_ratio, debt_equity       -> debt_to_equity");
    println!("  net_margin                  -> profit_margin");
    println!();
    Ok(())
}

fn parse_category(name: &str) -> Result<MetricCategory> {
    let wanted = name.trim().to_lowercase();
    match available_categories()
        .into_iter()
        .find(|c| format!("{c:?}").to_lowercase() == wanted)
    {
        Some(category) => Ok(category),
        None => {
            let known: Vec<String> = available_categories()
                .iter()
                .map(|c| format!("{c:?}").to_lowercase())
                .collect();
            bail!("unknown category '{name}', expected one of: {}", known.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("valuation").unwrap(), MetricCategory::Valuation);
        assert_eq!(parse_category(" Profitability ").unwrap(), MetricCategory::Profitability);
        assert!(parse_category("momentum").is_err());
    }

    #[test]
    fn test_every_metric_listed() {
        let listed: usize = available_categories()
            .iter()
            .map(|c| metrics_by_category(c).len())
            .sum();
        assert_eq!(listed, available_metrics().len());
    }
}
