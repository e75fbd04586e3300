//! CLI subcommand modules.
//!
//! This module contains the implementations for all fundi CLI subcommands.

pub(crate) mod compare;
pub(crate) mod metrics;
pub(crate) mod screen;

use fundi_traits::Metric;

/// Print a boxed section title.
pub(crate) fn print_header(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{title:^62}║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Print a heavy rule with a caption.
pub(crate) fn print_section(caption: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{caption}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Display a metric value in its natural unit.
pub(crate) fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::MarketCap | Metric::Revenue | Metric::NetIncome => format_money(value),
        m if m.is_fraction() => format!("{:.1}%", value * 100.0),
        _ => format!("{value:.2}"),
    }
}

fn format_money(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e12 {
        format!("{sign}${:.2}T", abs / 1e12)
    } else if abs >= 1e9 {
        format!("{sign}${:.2}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}${:.1}M", abs / 1e6)
    } else {
        format!("{sign}${abs:.0}")
    }
}

/// Display an optional value, `-` when absent.
pub(crate) fn format_opt(metric: Metric, value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format_value(metric, v))
}
