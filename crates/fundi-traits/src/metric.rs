//! Canonical metric identifiers and the fixed directionality table.

use crate::FundiError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Whether a larger value of a metric is preferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger values rank better (ROE, margins, growth).
    HigherIsBetter,
    /// Smaller values rank better (valuation multiples, leverage, size).
    LowerIsBetter,
}

impl Direction {
    /// Flip a value so that larger always means better.
    #[must_use]
    pub const fn orient(self, value: f64) -> f64 {
        match self {
            Self::HigherIsBetter => value,
            Self::LowerIsBetter => -value,
        }
    }

    /// Returns true if `a` is strictly better than `b`.
    #[must_use]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.orient(a) > self.orient(b)
    }
}

/// A canonical fundamental metric.
///
/// The set is closed: the normalizer only ever produces these keys and every
/// [`CanonicalMetrics`](crate::CanonicalMetrics) carries all of them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Trailing price to earnings.
    PeRatio,
    /// Forward price to earnings.
    ForwardPe,
    /// Price to book.
    PbRatio,
    /// Price to sales.
    PsRatio,
    /// Price/earnings to growth.
    PegRatio,
    /// Market capitalization in reporting currency.
    MarketCap,
    /// Latest annual revenue.
    Revenue,
    /// Latest annual net income.
    NetIncome,
    /// Year-over-year revenue growth as a fraction.
    RevenueGrowth,
    /// Net profit margin as a fraction.
    ProfitMargin,
    /// Operating margin as a fraction.
    OperatingMargin,
    /// Gross margin as a fraction.
    GrossMargin,
    /// Return on equity as a fraction.
    Roe,
    /// Return on assets as a fraction.
    Roa,
    /// Total debt over shareholder equity.
    DebtToEquity,
    /// Current assets over current liabilities.
    CurrentRatio,
    /// Quick assets over current liabilities.
    QuickRatio,
    /// Dividend yield as a fraction.
    DividendYield,
}

/// Attribute names a provider may report that can never back a numeric rule.
const NON_NUMERIC_FIELDS: &[&str] = &[
    "symbol", "ticker", "name", "sector", "industry", "currency", "exchange", "country",
];

impl Metric {
    /// Every metric, in canonical column order.
    pub const ALL: [Self; 18] = [
        Self::PeRatio,
        Self::ForwardPe,
        Self::PbRatio,
        Self::PsRatio,
        Self::PegRatio,
        Self::MarketCap,
        Self::Revenue,
        Self::NetIncome,
        Self::RevenueGrowth,
        Self::ProfitMargin,
        Self::OperatingMargin,
        Self::GrossMargin,
        Self::Roe,
        Self::Roa,
        Self::DebtToEquity,
        Self::CurrentRatio,
        Self::QuickRatio,
        Self::DividendYield,
    ];

    /// Canonical snake_case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PeRatio => "pe_ratio",
            Self::ForwardPe => "forward_pe",
            Self::PbRatio => "pb_ratio",
            Self::PsRatio => "ps_ratio",
            Self::PegRatio => "peg_ratio",
            Self::MarketCap => "market_cap",
            Self::Revenue => "revenue",
            Self::NetIncome => "net_income",
            Self::RevenueGrowth => "revenue_growth",
            Self::ProfitMargin => "profit_margin",
            Self::OperatingMargin => "operating_margin",
            Self::GrossMargin => "gross_margin",
            Self::Roe => "roe",
            Self::Roa => "roa",
            Self::DebtToEquity => "debt_to_equity",
            Self::CurrentRatio => "current_ratio",
            Self::QuickRatio => "quick_ratio",
            Self::DividendYield => "dividend_yield",
        }
    }

    /// Short human-readable label for tables.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PeRatio => "P/E",
            Self::ForwardPe => "Fwd P/E",
            Self::PbRatio => "P/B",
            Self::PsRatio => "P/S",
            Self::PegRatio => "PEG",
            Self::MarketCap => "Market Cap",
            Self::Revenue => "Revenue",
            Self::NetIncome => "Net Income",
            Self::RevenueGrowth => "Rev Growth",
            Self::ProfitMargin => "Net Margin",
            Self::OperatingMargin => "Op Margin",
            Self::GrossMargin => "Gross Margin",
            Self::Roe => "ROE",
            Self::Roa => "ROA",
            Self::DebtToEquity => "D/E",
            Self::CurrentRatio => "Current",
            Self::QuickRatio => "Quick",
            Self::DividendYield => "Div Yield",
        }
    }

    /// Ranking direction of this metric.
    ///
    /// Valuation multiples, leverage and size rank lower-is-better, matching a
    /// small-cap value orientation. Everything else ranks higher-is-better.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::PeRatio
            | Self::ForwardPe
            | Self::PbRatio
            | Self::PsRatio
            | Self::PegRatio
            | Self::MarketCap
            | Self::DebtToEquity => Direction::LowerIsBetter,
            Self::Revenue
            | Self::NetIncome
            | Self::RevenueGrowth
            | Self::ProfitMargin
            | Self::OperatingMargin
            | Self::GrossMargin
            | Self::Roe
            | Self::Roa
            | Self::CurrentRatio
            | Self::QuickRatio
            | Self::DividendYield => Direction::HigherIsBetter,
        }
    }

    /// Whether the metric is a ratio expressed as a fraction (0.12 = 12%).
    #[must_use]
    pub const fn is_fraction(&self) -> bool {
        matches!(
            self,
            Self::RevenueGrowth
                | Self::ProfitMargin
                | Self::OperatingMargin
                | Self::GrossMargin
                | Self::Roe
                | Self::Roa
                | Self::DividendYield
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = FundiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        let metric = match key.as_str() {
            "pe_ratio" | "pe" | "p/e" | "trailing_pe" | "price_to_earnings" => Self::PeRatio,
            "forward_pe" | "forward_pe_ratio" => Self::ForwardPe,
            "pb_ratio" | "pb" | "p/b" | "price_to_book" => Self::PbRatio,
            "ps_ratio" | "ps" | "p/s" | "price_to_sales" => Self::PsRatio,
            "peg_ratio" | "peg" => Self::PegRatio,
            "market_cap" | "mcap" | "market_capitalization" => Self::MarketCap,
            "revenue" | "total_revenue" => Self::Revenue,
            "net_income" => Self::NetIncome,
            "revenue_growth" | "growth" => Self::RevenueGrowth,
            "profit_margin" | "net_margin" | "net_profit_margin" => Self::ProfitMargin,
            "operating_margin" => Self::OperatingMargin,
            "gross_margin" => Self::GrossMargin,
            "roe" | "return_on_equity" => Self::Roe,
            "roa" | "return_on_assets" => Self::Roa,
            "debt_to_equity" | "debt_equity" | "de_ratio" => Self::DebtToEquity,
            "current_ratio" => Self::CurrentRatio,
            "quick_ratio" => Self::QuickRatio,
            "dividend_yield" => Self::DividendYield,
            other if NON_NUMERIC_FIELDS.contains(&other) => {
                return Err(FundiError::InvalidRule(format!(
                    "metric '{s}' is non-numeric and cannot be compared against a threshold"
                )));
            }
            _ => {
                return Err(FundiError::InvalidRule(format!("unknown metric '{s}'")));
            }
        };
        Ok(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("P/E".parse::<Metric>().unwrap(), Metric::PeRatio);
        assert_eq!("debt-equity".parse::<Metric>().unwrap(), Metric::DebtToEquity);
        assert_eq!(
            "Return on Equity".parse::<Metric>().unwrap(),
            Metric::Roe
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = "sector".parse::<Metric>().unwrap_err();
        assert!(matches!(err, FundiError::InvalidRule(ref m) if m.contains("non-numeric")));
    }

    #[test]
    fn test_unknown_rejected() {
        let err = "vibes".parse::<Metric>().unwrap_err();
        assert!(matches!(err, FundiError::InvalidRule(ref m) if m.contains("unknown")));
    }

    #[test]
    fn test_directionality() {
        assert_eq!(Metric::PeRatio.direction(), Direction::LowerIsBetter);
        assert_eq!(Metric::Roe.direction(), Direction::HigherIsBetter);
        assert!(Direction::LowerIsBetter.is_better(10.0, 20.0));
        assert!(!Direction::LowerIsBetter.is_better(10.0, 10.0));
        assert!(Direction::HigherIsBetter.is_better(0.2, 0.1));
    }

    #[test]
    fn test_serde_names_match_as_str() {
        let json = serde_json::to_string(&Metric::DebtToEquity).unwrap();
        assert_eq!(json, "\"debt_to_equity\"");
    }
}
