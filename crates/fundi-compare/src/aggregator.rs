//! Multi-company comparison tables.

use crate::rank::competition_ranks;
use fundi_traits::{CanonicalMetrics, Metric, Result, Symbol, stats::standardize};
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One ticker's standing on one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricComparison {
    /// Reported value
    pub value: f64,
    /// 1 = best among peers reporting the metric
    pub rank: usize,
    /// Share of peers strictly worse
    pub percentile: f64,
    /// Standard score of the raw value across peers
    pub z_score: f64,
}

/// Per-ticker, per-metric comparison results.
///
/// Tickers missing a metric have no entry for it. Metrics no ticker reports
/// are left out of the table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonTable {
    tickers: Vec<Symbol>,
    metrics: Vec<Metric>,
    rows: BTreeMap<Symbol, BTreeMap<Metric, MetricComparison>>,
}

impl ComparisonTable {
    /// Tickers in input order.
    #[must_use]
    pub fn tickers(&self) -> &[Symbol] {
        &self.tickers
    }

    /// Metrics with at least one value, in canonical order.
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Whether the table has a column for `metric`.
    #[must_use]
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Comparison of one ticker on one metric.
    #[must_use]
    pub fn get(&self, ticker: &str, metric: Metric) -> Option<&MetricComparison> {
        self.rows.get(ticker)?.get(&metric)
    }

    /// All metrics of one ticker.
    #[must_use]
    pub fn row(&self, ticker: &str) -> Option<&BTreeMap<Metric, MetricComparison>> {
        self.rows.get(ticker)
    }

    /// Ranked tickers for a metric, in input order.
    #[must_use]
    pub fn column(&self, metric: Metric) -> Vec<(&str, &MetricComparison)> {
        self.tickers
            .iter()
            .filter_map(|t| self.get(t, metric).map(|c| (t.as_str(), c)))
            .collect()
    }

    /// Best `n` tickers on a metric, by rank then ticker.
    #[must_use]
    pub fn leaders(&self, metric: Metric, n: usize) -> Vec<(&str, &MetricComparison)> {
        let mut column = self.column(metric);
        column.sort_by(|a, b| a.1.rank.cmp(&b.1.rank).then_with(|| a.0.cmp(b.0)));
        column.truncate(n);
        column
    }

    /// Export in long format: one row per ticker and metric.
    ///
    /// # Errors
    ///
    /// Returns an error if DataFrame construction fails.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut tickers = Vec::new();
        let mut metrics = Vec::new();
        let mut values = Vec::new();
        let mut ranks = Vec::new();
        let mut percentiles = Vec::new();
        let mut z_scores = Vec::new();

        for ticker in &self.tickers {
            for metric in &self.metrics {
                if let Some(c) = self.get(ticker, *metric) {
                    tickers.push(ticker.as_str());
                    metrics.push(metric.as_str());
                    values.push(c.value);
                    ranks.push(u32::try_from(c.rank).unwrap_or(u32::MAX));
                    percentiles.push(c.percentile);
                    z_scores.push(c.z_score);
                }
            }
        }

        Ok(df! {
            "ticker" => tickers,
            "metric" => metrics,
            "value" => values,
            "rank" => ranks,
            "percentile" => percentiles,
            "z_score" => z_scores,
        }?)
    }
}

/// Builds [`ComparisonTable`]s from normalized records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonAggregator;

impl ComparisonAggregator {
    /// Create a new aggregator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Rank every metric across `records`.
    ///
    /// A ticker appearing twice keeps its first record.
    #[must_use]
    pub fn compare(&self, records: &[CanonicalMetrics]) -> ComparisonTable {
        let records = dedupe(records);
        let tickers: Vec<Symbol> = records.iter().map(|r| r.ticker().to_string()).collect();
        let mut rows: BTreeMap<Symbol, BTreeMap<Metric, MetricComparison>> = tickers
            .iter()
            .map(|t| (t.clone(), BTreeMap::new()))
            .collect();
        let mut metrics = Vec::new();

        for metric in Metric::ALL {
            let (present, values): (Vec<&str>, Vec<f64>) = records
                .iter()
                .filter_map(|r| r.get(metric).map(|v| (r.ticker(), v)))
                .unzip();
            if values.is_empty() {
                continue;
            }

            let ranked = competition_ranks(&values, metric.direction());
            let z = standardize(&values);
            for (i, ticker) in present.iter().enumerate() {
                if let Some(row) = rows.get_mut(*ticker) {
                    row.insert(
                        metric,
                        MetricComparison {
                            value: values[i],
                            rank: ranked[i].rank,
                            percentile: ranked[i].percentile,
                            z_score: z[i],
                        },
                    );
                }
            }
            metrics.push(metric);
        }

        tracing::debug!(
            tickers = tickers.len(),
            metrics = metrics.len(),
            "built comparison table"
        );
        ComparisonTable {
            tickers,
            metrics,
            rows,
        }
    }
}

/// First occurrence of each ticker, in input order.
pub(crate) fn dedupe(records: &[CanonicalMetrics]) -> Vec<&CanonicalMetrics> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .filter(|r| {
            let first = seen.insert(r.ticker());
            if !first {
                tracing::warn!(ticker = r.ticker(), "duplicate ticker ignored");
            }
            first
        })
        .collect()
}
