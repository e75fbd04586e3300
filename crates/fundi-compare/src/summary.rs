//! Sector-level aggregates.

use crate::aggregator::dedupe;
use fundi_traits::{CanonicalMetrics, Metric, Symbol, stats};
use serde::Serialize;
use std::collections::BTreeMap;

/// Central tendency of one metric across a sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    /// Companies reporting the metric
    pub count: usize,
    /// Mean over reported values
    pub mean: f64,
    /// Median over reported values
    pub median: f64,
}

/// Sector aggregates plus the companies that look cheap relative to peers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectorSummary {
    /// Sector label, if known
    pub sector: Option<String>,
    /// Distinct companies summarized
    pub company_count: usize,
    /// Per-metric aggregates; metrics nobody reports are absent
    pub metrics: BTreeMap<Metric, MetricSummary>,
    /// Tickers with P/E below the sector median and ROE above it
    pub undervalued: Vec<Symbol>,
}

impl SectorSummary {
    /// Summarize `records`. The sector label is taken from `sector` or, when
    /// `None`, from the first record that carries one.
    #[must_use]
    pub fn from_records(sector: Option<&str>, records: &[CanonicalMetrics]) -> Self {
        let records = dedupe(records);
        let sector = sector
            .map(str::to_string)
            .or_else(|| records.iter().find_map(|r| r.sector().map(str::to_string)));

        let mut metrics = BTreeMap::new();
        for metric in Metric::ALL {
            let values: Vec<f64> = records.iter().filter_map(|r| r.get(metric)).collect();
            if let (Some(mean), Some(median)) = (stats::mean(&values), stats::median(&values)) {
                metrics.insert(
                    metric,
                    MetricSummary {
                        count: values.len(),
                        mean,
                        median,
                    },
                );
            }
        }

        let undervalued = match (metrics.get(&Metric::PeRatio), metrics.get(&Metric::Roe)) {
            (Some(pe), Some(roe)) => records
                .iter()
                .filter(|r| {
                    matches!(
                        (r.get(Metric::PeRatio), r.get(Metric::Roe)),
                        (Some(p), Some(e)) if p < pe.median && e > roe.median
                    )
                })
                .map(|r| r.ticker().to_string())
                .collect(),
            _ => Vec::new(),
        };

        Self {
            sector,
            company_count: records.len(),
            metrics,
            undervalued,
        }
    }

    /// Aggregate for one metric.
    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.get(&metric)
    }
}
