#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Crate Organization
//!
//! - [`traits`] - Core types ([`Metric`], [`CanonicalMetrics`], [`DataProvider`], ...)
//! - [`metrics`] - Payload normalization and the metric registry
//! - [`criteria`] - Screening rules and evaluation
//! - [`screen`] - Sector screening and composite scoring
//! - [`compare`] - Peer comparison tables and sector summaries
//! - [`fmp`] - Financial Modeling Prep provider

/// Version information for the fundi crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types shared by every fundi crate.
pub mod traits {
    pub use fundi_traits::*;
}

// Re-export core types at top level for convenience
pub use fundi_traits::{
    CanonicalMetrics, DataProvider, Date, Direction, MarketCapBucket, Metric, RawRecord,
    StaticProvider, Symbol,
};

// Re-export error types
pub use fundi_traits::{FundiError, Result};

// ============================================================================
// Normalization
// ============================================================================

/// Fundamentals normalization.
///
/// Provider field names are mapped onto canonical metrics through a fixed
/// lookup table; strings such as `"12%"` or `"$1,200"` are coerced, and
/// anything unparsable is absent.
///
/// # Example
///
/// ```ignore
/// use fundi::metrics::FundamentalsNormalizer;
///
/// let metrics = FundamentalsNormalizer::default().normalize(&raw)?;
/// println!("P/E: {:?}", metrics.get(fundi::Metric::PeRatio));
/// ```
pub mod metrics {
    pub use fundi_metrics::*;
}

// ============================================================================
// Criteria
// ============================================================================

/// Screening rules and their evaluation.
///
/// ## Rule expressions
///
/// ```text
/// pe_ratio <= 15          required rule
/// roe >= 10%              percent thresholds are fractions
/// dividend_yield > 0 ?    optional: reported, never rejects
/// peg_ratio < 1 ~         skipped when the metric is missing
/// ```
pub mod criteria {
    pub use fundi_criteria::*;
}

// ============================================================================
// Screening
// ============================================================================

/// Sector screening.
///
/// ## Composite score
///
/// For each metric referenced by the rule set, values are standardized across
/// every resolved ticker and sign-adjusted so that higher is better:
///
/// ```text
/// w_r   = weight(metric_r) / rules_referencing(metric_r)
/// score = sum(w_r * z(metric_r) for passing r) / sum(w_r for non-skipped r)
/// ```
pub mod screen {
    pub use fundi_screen::*;
}

// ============================================================================
// Comparison
// ============================================================================

/// Peer comparison and sector summaries.
pub mod compare {
    pub use fundi_compare::*;
}

// ============================================================================
// Data Providers
// ============================================================================

/// Financial Modeling Prep (FMP) provider.
///
/// ## Setup
///
/// 1. Get a free API key at <https://financialmodelingprep.com/>
/// 2. Set the `FMP_API_KEY` environment variable or add to `.env` file
pub mod fmp {
    pub use fundi_fmp::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use fundi::prelude::*;
/// ```
pub mod prelude {
    pub use crate::compare::{ComparisonAggregator, ComparisonTable, SectorSummary};
    pub use crate::criteria::{Comparator, CriteriaEvaluator, CriteriaRule, CriteriaSet};
    pub use crate::fmp::FmpClient;
    pub use crate::metrics::FundamentalsNormalizer;
    pub use crate::screen::{ScreenerConfig, ScreeningReport, SectorScreener};
    pub use crate::{
        CanonicalMetrics, DataProvider, FundiError, Metric, Result, StaticProvider, Symbol,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use serde_json::json;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        let parts: Vec<&str> = super::VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_re_exports() {
        fn _accept_provider(_provider: &dyn DataProvider) {}
        let _result: Result<()> = Err(FundiError::InvalidRule("test".to_string()));
    }

    #[tokio::test]
    async fn test_pipeline_through_prelude() {
        let provider = StaticProvider::new()
            .with_sector("Technology", ["AAA", "BBB"])
            .with_record("AAA", json!({"peRatio": 12.0, "roe": 0.2}))
            .with_record("BBB", json!({"peRatio": 40.0, "roe": 0.3}));

        let screener = SectorScreener::new(provider);
        let rules = CriteriaSet::parse_all(["pe_ratio <= 15"]).unwrap();
        let report = screener.screen("tech", &rules).await.unwrap();
        assert_eq!(report.candidates.len(), 1);

        let records: Vec<CanonicalMetrics> = report.evaluated().map(|r| r.metrics.clone()).collect();
        let table = ComparisonAggregator::new().compare(&records);
        assert_eq!(table.get("BBB", Metric::Roe).unwrap().rank, 1);
        assert_eq!(table.get("AAA", Metric::PeRatio).unwrap().rank, 1);
    }
}
