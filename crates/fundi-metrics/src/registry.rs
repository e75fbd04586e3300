//! Metric registry for discovering and categorizing canonical metrics.

use fundi_traits::{Direction, Metric};
use serde::{Deserialize, Serialize};

/// Metric category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricCategory {
    /// Price multiples
    Valuation,
    /// Company size and scale
    Size,
    /// Growth rates
    Growth,
    /// Margins and returns
    Profitability,
    /// Balance-sheet leverage
    Leverage,
    /// Short-term solvency
    Liquidity,
    /// Shareholder income
    Income,
}

impl MetricCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Valuation => "Price multiples comparing market value to fundamentals",
            Self::Size => "Market capitalization and absolute scale",
            Self::Growth => "Revenue and earnings growth",
            Self::Profitability => "Margins and returns on capital",
            Self::Leverage => "Debt relative to equity",
            Self::Liquidity => "Ability to cover short-term obligations",
            Self::Income => "Cash returned to shareholders",
        }
    }
}

/// Metadata about a canonical metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricInfo {
    /// The metric
    pub metric: Metric,

    /// Category classification
    pub category: MetricCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Whether the normalizer can derive the metric from statement lines
    pub derivable: bool,
}

impl MetricInfo {
    /// Ranking direction of the metric.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.metric.direction()
    }
}

const fn info(
    metric: Metric,
    category: MetricCategory,
    description: &'static str,
    derivable: bool,
) -> MetricInfo {
    MetricInfo {
        metric,
        category,
        description,
        derivable,
    }
}

/// Get information about all canonical metrics, in canonical order.
#[must_use]
pub fn available_metrics() -> Vec<MetricInfo> {
    use MetricCategory::{Growth, Income, Leverage, Liquidity, Profitability, Size, Valuation};
    vec![
        info(Metric::PeRatio, Valuation, "Trailing price to earnings", false),
        info(Metric::ForwardPe, Valuation, "Price to forward earnings estimate", false),
        info(Metric::PbRatio, Valuation, "Price to book value", false),
        info(Metric::PsRatio, Valuation, "Price to trailing sales", false),
        info(Metric::PegRatio, Valuation, "P/E divided by earnings growth", false),
        info(Metric::MarketCap, Size, "Market capitalization", false),
        info(Metric::Revenue, Size, "Latest annual revenue", false),
        info(Metric::NetIncome, Profitability, "Latest annual net income", false),
        info(Metric::RevenueGrowth, Growth, "Year-over-year revenue growth", true),
        info(Metric::ProfitMargin, Profitability, "Net income over revenue", true),
        info(Metric::OperatingMargin, Profitability, "Operating income over revenue", false),
        info(Metric::GrossMargin, Profitability, "Gross profit over revenue", false),
        info(Metric::Roe, Profitability, "Net income over shareholder equity", true),
        info(Metric::Roa, Profitability, "Net income over total assets", false),
        info(Metric::DebtToEquity, Leverage, "Total debt over shareholder equity", true),
        info(Metric::CurrentRatio, Liquidity, "Current assets over current liabilities", false),
        info(Metric::QuickRatio, Liquidity, "Quick assets over current liabilities", false),
        info(Metric::DividendYield, Income, "Annual dividend over price", false),
    ]
}

/// Get all metrics in a specific category.
#[must_use]
pub fn metrics_by_category(category: &MetricCategory) -> Vec<MetricInfo> {
    available_metrics()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a metric by name or alias.
#[must_use]
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    let metric: Metric = name.parse().ok()?;
    available_metrics().into_iter().find(|info| info.metric == metric)
}

/// Get all categories that have metrics, in first-seen order.
#[must_use]
pub fn available_categories() -> Vec<MetricCategory> {
    let mut categories: Vec<MetricCategory> = Vec::new();
    for info in available_metrics() {
        if !categories.contains(&info.category) {
            categories.push(info.category);
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_metric_in_order() {
        let metrics: Vec<Metric> = available_metrics().into_iter().map(|i| i.metric).collect();
        assert_eq!(metrics, Metric::ALL.to_vec());
    }

    #[test]
    fn test_metrics_by_category() {
        assert_eq!(metrics_by_category(&MetricCategory::Valuation).len(), 5);
        assert_eq!(metrics_by_category(&MetricCategory::Leverage).len(), 1);
    }

    #[test]
    fn test_get_metric_info() {
        let info = get_metric_info("return_on_equity").unwrap();
        assert_eq!(info.metric, Metric::Roe);
        assert_eq!(info.direction(), Direction::HigherIsBetter);
        assert!(info.derivable);

        assert!(get_metric_info("sector").is_none());
        assert!(get_metric_info("nonexistent").is_none());
    }

    #[test]
    fn test_available_categories() {
        let categories = available_categories();
        assert_eq!(categories.first(), Some(&MetricCategory::Valuation));
        assert_eq!(categories.len(), 7);
    }

    #[test]
    fn test_category_descriptions() {
        for category in available_categories() {
            assert!(!category.description().is_empty());
        }
    }
}
