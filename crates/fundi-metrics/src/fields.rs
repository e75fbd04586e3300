//! Provider field lookup table.
//!
//! Each canonical metric lists the provider field names it can be read from,
//! in priority order. Canonical snake_case names come first so already
//! normalized fixtures pass straight through, followed by Financial Modeling
//! Prep names and Yahoo-style names.

use fundi_traits::Metric;

/// Provider field names for every directly reported metric.
pub(crate) const METRIC_FIELDS: &[(Metric, &[&str])] = &[
    (
        Metric::PeRatio,
        &["pe_ratio", "peRatio", "priceEarningsRatio", "trailingPE", "pe"],
    ),
    (Metric::ForwardPe, &["forward_pe", "forwardPE", "forwardPe"]),
    (
        Metric::PbRatio,
        &["pb_ratio", "pbRatio", "priceToBookRatio", "priceToBook"],
    ),
    (
        Metric::PsRatio,
        &[
            "ps_ratio",
            "priceToSalesRatio",
            "priceToSalesTrailing12Months",
        ],
    ),
    (
        Metric::PegRatio,
        &["peg_ratio", "pegRatio", "priceEarningsToGrowthRatio"],
    ),
    (Metric::MarketCap, &["market_cap", "marketCap", "mktCap"]),
    (Metric::Revenue, REVENUE_FIELDS),
    (Metric::NetIncome, NET_INCOME_FIELDS),
    (Metric::RevenueGrowth, &["revenue_growth", "revenueGrowth"]),
    (
        Metric::ProfitMargin,
        &["profit_margin", "profitMargins", "netProfitMargin"],
    ),
    (
        Metric::OperatingMargin,
        &[
            "operating_margin",
            "operatingMargins",
            "operatingProfitMargin",
        ],
    ),
    (
        Metric::GrossMargin,
        &["gross_margin", "grossMargins", "grossProfitMargin"],
    ),
    (Metric::Roe, &["roe", "returnOnEquity"]),
    (Metric::Roa, &["roa", "returnOnAssets"]),
    (
        Metric::DebtToEquity,
        &[
            "debt_to_equity",
            "debtToEquity",
            "debtEquityRatio",
            "debtToEquityRatio",
        ],
    ),
    (Metric::CurrentRatio, &["current_ratio", "currentRatio"]),
    (Metric::QuickRatio, &["quick_ratio", "quickRatio"]),
    (Metric::DividendYield, &["dividend_yield", "dividendYield"]),
];

pub(crate) const REVENUE_FIELDS: &[&str] = &[
    "revenue",
    "current_revenue",
    "currentRevenue",
    "totalRevenue",
    "Total Revenue",
];

pub(crate) const NET_INCOME_FIELDS: &[&str] = &["net_income", "netIncome", "Net Income"];

pub(crate) const PRIOR_REVENUE_FIELDS: &[&str] =
    &["prior_revenue", "priorRevenue", "previousRevenue"];

pub(crate) const TOTAL_EQUITY_FIELDS: &[&str] = &[
    "total_equity",
    "totalStockholdersEquity",
    "totalEquity",
    "shareholder_equity",
];

pub(crate) const TOTAL_DEBT_FIELDS: &[&str] = &["total_debt", "totalDebt"];

pub(crate) const SECTOR_FIELDS: &[&str] = &["sector"];

pub(crate) const AS_OF_FIELDS: &[&str] = &["as_of", "asOf", "date"];

pub(crate) const SYMBOL_FIELDS: &[&str] = &["symbol", "ticker"];

/// Lookup aliases for a metric.
pub(crate) fn aliases(metric: Metric) -> &'static [&'static str] {
    METRIC_FIELDS
        .iter()
        .find(|(m, _)| *m == metric)
        .map_or(&[], |(_, fields)| *fields)
}
