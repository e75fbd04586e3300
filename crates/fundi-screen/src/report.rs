//! Screening results and the per-scan report.

use fundi_traits::{CanonicalMetrics, FundiError, MarketCapBucket, Metric, Result, Symbol};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Evaluation of one resolved ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningResult {
    /// Ticker symbol
    pub ticker: Symbol,
    /// No required rule failed
    pub passed: bool,
    /// Failed rule names in declaration order
    pub failed_rules: Vec<String>,
    /// Rules skipped for missing data
    pub skipped_rules: Vec<String>,
    /// Composite score relative to the rest of the universe
    pub score: f64,
    /// Size bucket, when market cap is known
    pub cap_bucket: Option<MarketCapBucket>,
    /// Record is older than the configured maximum age
    pub stale: bool,
    /// Normalized metrics the result was computed from
    pub metrics: CanonicalMetrics,
}

impl ScreeningResult {
    /// Rank order: score descending, ticker ascending on ties.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.ticker.cmp(&other.ticker))
    }
}

/// Why a ticker has no evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Provider does not know the ticker
    NotFound,
    /// Provider refused the request
    RateLimited,
    /// Request failed in transit
    Network,
    /// Payload could not be normalized
    Malformed,
    /// Any other provider failure
    Provider,
    /// No outcome before the scan deadline
    Timeout,
}

impl UnresolvedReason {
    /// Short label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::RateLimited => "rate limited",
            Self::Network => "network error",
            Self::Malformed => "malformed record",
            Self::Provider => "provider error",
            Self::Timeout => "timed out",
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&FundiError> for UnresolvedReason {
    fn from(err: &FundiError) -> Self {
        match err {
            FundiError::NotFound(_) => Self::NotFound,
            FundiError::RateLimited(_) => Self::RateLimited,
            FundiError::Network(_) => Self::Network,
            FundiError::MalformedRecord(_) => Self::Malformed,
            _ => Self::Provider,
        }
    }
}

/// A ticker the scan could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedTicker {
    /// Ticker symbol
    pub ticker: Symbol,
    /// Failure class
    pub reason: UnresolvedReason,
    /// Underlying error message
    pub message: String,
}

impl UnresolvedTicker {
    /// Classify a provider or normalization error.
    #[must_use]
    pub fn from_error(ticker: impl Into<Symbol>, err: &FundiError) -> Self {
        Self {
            ticker: ticker.into(),
            reason: err.into(),
            message: err.to_string(),
        }
    }

    /// A ticker that produced no outcome before the deadline.
    #[must_use]
    pub fn timed_out(ticker: impl Into<Symbol>) -> Self {
        Self {
            ticker: ticker.into(),
            reason: UnresolvedReason::Timeout,
            message: "no response before the scan deadline".to_string(),
        }
    }
}

/// Outcome of one sector scan: passing candidates, failing-but-scored
/// tickers, and unresolved tickers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningReport {
    /// Canonical sector name the scan ran against
    pub sector: String,
    /// Passing tickers in rank order
    pub candidates: Vec<ScreeningResult>,
    /// Failing tickers in rank order
    pub failures: Vec<ScreeningResult>,
    /// Tickers without an evaluation, in universe order
    pub unresolved: Vec<UnresolvedTicker>,
    /// Whether [`ranked`](Self::ranked) includes failures
    pub include_failures: bool,
}

impl ScreeningReport {
    /// The top-level ranked view.
    ///
    /// Candidates only, unless the report was produced with
    /// `include_failures`, in which case failures are merged in by rank.
    #[must_use]
    pub fn ranked(&self) -> Vec<&ScreeningResult> {
        let mut ranked: Vec<&ScreeningResult> = self.candidates.iter().collect();
        if self.include_failures {
            ranked.extend(self.failures.iter());
            ranked.sort_by(|a, b| a.rank_cmp(b));
        }
        ranked
    }

    /// Every evaluated ticker, candidates first.
    pub fn evaluated(&self) -> impl Iterator<Item = &ScreeningResult> {
        self.candidates.iter().chain(self.failures.iter())
    }

    /// Number of evaluated tickers.
    #[must_use]
    pub fn evaluated_count(&self) -> usize {
        self.candidates.len() + self.failures.len()
    }

    /// Look up an evaluated ticker.
    #[must_use]
    pub fn result(&self, ticker: &str) -> Option<&ScreeningResult> {
        self.evaluated().find(|r| r.ticker == ticker)
    }

    /// Export the ranked view as a DataFrame with one column per metric.
    ///
    /// # Errors
    ///
    /// Returns an error if DataFrame construction fails.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let rows = self.ranked();
        let tickers: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
        let passed: Vec<bool> = rows.iter().map(|r| r.passed).collect();
        let scores: Vec<f64> = rows.iter().map(|r| r.score).collect();
        let buckets: Vec<Option<String>> = rows
            .iter()
            .map(|r| r.cap_bucket.map(|b| b.to_string()))
            .collect();
        let stale: Vec<bool> = rows.iter().map(|r| r.stale).collect();
        let failed: Vec<String> = rows.iter().map(|r| r.failed_rules.join(",")).collect();

        let mut df = df! {
            "ticker" => tickers,
            "passed" => passed,
            "score" => scores,
            "cap_bucket" => buckets,
            "stale" => stale,
            "failed_rules" => failed,
        }?;

        for metric in Metric::ALL {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.metrics.get(metric)).collect();
            df.with_column(Series::new(metric.as_str().into(), values))?;
        }

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(ticker: &str, passed: bool, score: f64) -> ScreeningResult {
        ScreeningResult {
            ticker: ticker.to_string(),
            passed,
            failed_rules: if passed { vec![] } else { vec!["max_pe_ratio".into()] },
            skipped_rules: vec![],
            score,
            cap_bucket: Some(MarketCapBucket::Small),
            stale: false,
            metrics: CanonicalMetrics::from_values(ticker, [(Metric::PeRatio, 12.0)]),
        }
    }

    fn report(include_failures: bool) -> ScreeningReport {
        ScreeningReport {
            sector: "Healthcare".into(),
            candidates: vec![result("B", true, 0.8), result("A", true, 0.2)],
            failures: vec![result("C", false, 0.5)],
            unresolved: vec![],
            include_failures,
        }
    }

    #[test]
    fn test_rank_cmp_breaks_ties_by_ticker() {
        let mut rows = vec![result("MSFT", true, 1.0), result("AAPL", true, 1.0), result("IBM", true, 2.0)];
        rows.sort_by(ScreeningResult::rank_cmp);
        let order: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["IBM", "AAPL", "MSFT"]);
    }

    #[test]
    fn test_ranked_excludes_failures_by_default() {
        let report = report(false);
        let order: Vec<&str> = report.ranked().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
        assert_eq!(report.evaluated_count(), 3);
        assert!(report.result("C").is_some());
    }

    #[test]
    fn test_ranked_merges_failures_when_requested() {
        let report = report(true);
        let order: Vec<&str> = report.ranked().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_unresolved_reason_from_error() {
        let u = UnresolvedTicker::from_error("ZZZZ", &FundiError::NotFound("ZZZZ".into()));
        assert_eq!(u.reason, UnresolvedReason::NotFound);
        assert!(u.message.contains("ZZZZ"));
        let u = UnresolvedTicker::from_error("X", &FundiError::DataFetch("boom".into()));
        assert_eq!(u.reason, UnresolvedReason::Provider);
        assert_eq!(UnresolvedTicker::timed_out("Y").reason, UnresolvedReason::Timeout);
    }

    #[test]
    fn test_to_frame() {
        let df = report(true).to_frame().unwrap();
        assert_eq!(df.height(), 3);
        assert!(df.column("ticker").is_ok());
        assert!(df.column("score").is_ok());
        assert!(df.column("pe_ratio").is_ok());
        assert!(df.column("dividend_yield").is_ok());
        assert_eq!(df.width(), 6 + Metric::ALL.len());
    }
}
