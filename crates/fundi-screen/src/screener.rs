//! Sector screener.

use crate::report::{ScreeningReport, ScreeningResult, UnresolvedTicker};
use crate::score::{CompositeScorer, ScoreWeights};
use chrono::Local;
use fundi_criteria::{CriteriaEvaluator, CriteriaSet};
use fundi_metrics::FundamentalsNormalizer;
use fundi_traits::{CanonicalMetrics, DataProvider, Date, FundiError, RawRecord, Result, Symbol};
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::Instrument;

/// Configuration for a [`SectorScreener`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Merge failing tickers into the ranked view
    pub include_failures: bool,

    /// Maximum in-flight provider requests
    pub concurrency: usize,

    /// Deadline for the whole scan; tickers without an outcome are unresolved
    pub timeout: Option<Duration>,

    /// Retry once on transient network errors
    pub retry_transient: bool,

    /// Per-metric score weights
    pub weights: ScoreWeights,

    /// Records older than this many days are flagged stale
    pub max_record_age_days: Option<i64>,

    /// Date staleness is measured from; today when unset
    pub reference_date: Option<Date>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            include_failures: false,
            concurrency: 4,
            timeout: None,
            retry_transient: true,
            weights: ScoreWeights::default(),
            max_record_age_days: None,
            reference_date: None,
        }
    }
}

/// Canonical sector name for common spellings, title case otherwise.
///
/// # Examples
///
/// ```
/// use fundi_screen::normalize_sector_name;
///
/// assert_eq!(normalize_sector_name("health care"), "Healthcare");
/// assert_eq!(normalize_sector_name("  tech "), "Technology");
/// assert_eq!(normalize_sector_name("basic materials"), "Basic Materials");
/// ```
#[must_use]
pub fn normalize_sector_name(sector: &str) -> String {
    let key = sector.trim().to_lowercase();
    let canonical = match key.as_str() {
        "tech" | "technology" => "Technology",
        "healthcare" | "health care" => "Healthcare",
        "financial" | "financials" | "finance" | "financial services" => "Financial Services",
        "consumer discretionary" => "Consumer Discretionary",
        "consumer staples" => "Consumer Staples",
        "industrial" | "industrials" => "Industrials",
        "energy" => "Energy",
        "materials" => "Materials",
        "utilities" => "Utilities",
        "real estate" => "Real Estate",
        "communication services" | "communications" => "Communication Services",
        _ => return title_case(&key),
    };
    canonical.to_string()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Screens a sector's ticker universe against a rule set.
///
/// The provider is injected once and reused for every scan. Each ticker goes
/// through fetch, normalize and evaluate independently; a failure for one
/// ticker is reported as unresolved and never aborts the scan.
#[derive(Debug)]
pub struct SectorScreener<P> {
    provider: P,
    normalizer: FundamentalsNormalizer,
    evaluator: CriteriaEvaluator,
    config: ScreenerConfig,
}

impl<P: DataProvider> SectorScreener<P> {
    /// Create a screener with the default configuration.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ScreenerConfig::default())
    }

    /// Create a screener with an explicit configuration.
    pub fn with_config(provider: P, config: ScreenerConfig) -> Self {
        Self {
            provider,
            normalizer: FundamentalsNormalizer::default(),
            evaluator: CriteriaEvaluator::new(),
            config,
        }
    }

    /// Replace the normalizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: FundamentalsNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The injected provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Active configuration.
    pub const fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Screen every ticker the provider lists for `sector`.
    ///
    /// The configured timeout covers the listing and the fetches together.
    ///
    /// # Errors
    ///
    /// Returns an error only if the sector universe cannot be listed, including
    /// [`FundiError::DataFetch`] when the listing outlives the timeout.
    pub async fn screen(&self, sector: &str, rules: &CriteriaSet) -> Result<ScreeningReport> {
        let sector = normalize_sector_name(sector);
        let deadline = self.deadline();
        let listing = self.provider.list_sector_tickers(&sector);
        let tickers = match deadline {
            Some(deadline) => timeout_at(deadline, listing).await.map_err(|_| {
                FundiError::DataFetch(format!("listing sector '{sector}' timed out"))
            })??,
            None => listing.await?,
        };
        Ok(self.scan(&sector, &tickers, rules, deadline).await)
    }

    /// Screen `sector` with `max_<metric>` / `min_<metric>` thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`](fundi_traits::FundiError::InvalidRule)
    /// for a bad threshold key, or an error if the universe cannot be listed.
    pub async fn screen_by_criteria<I, K>(&self, sector: &str, thresholds: I) -> Result<ScreeningReport>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let rules = CriteriaSet::from_thresholds(thresholds)?;
        self.screen(sector, &rules).await
    }

    /// Screen `sector` with the small-cap value preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the sector universe cannot be listed.
    pub async fn screen_small_caps(&self, sector: &str) -> Result<ScreeningReport> {
        self.screen(sector, &CriteriaSet::small_cap_value()).await
    }

    /// Screen an explicit ticker list. Never fails; per-ticker errors land in
    /// [`ScreeningReport::unresolved`].
    pub async fn screen_tickers(
        &self,
        sector: &str,
        tickers: &[Symbol],
        rules: &CriteriaSet,
    ) -> ScreeningReport {
        self.scan(sector, tickers, rules, self.deadline()).await
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.timeout.map(|limit| Instant::now() + limit)
    }

    async fn scan(
        &self,
        sector: &str,
        tickers: &[Symbol],
        rules: &CriteriaSet,
        deadline: Option<Instant>,
    ) -> ScreeningReport {
        let span = tracing::info_span!("screen", sector, universe = tickers.len(), rules = rules.len());
        self.run(sector, tickers, rules, deadline).instrument(span).await
    }

    async fn run(
        &self,
        sector: &str,
        tickers: &[Symbol],
        rules: &CriteriaSet,
        deadline: Option<Instant>,
    ) -> ScreeningReport {
        let mut seen = BTreeSet::new();
        let universe: Vec<&Symbol> = tickers.iter().filter(|t| seen.insert(t.as_str())).collect();
        tracing::info!(provider = self.provider.name(), "starting scan");

        let mut outcomes: BTreeMap<&str, Result<CanonicalMetrics>> = BTreeMap::new();
        let fetches = stream::iter(universe.iter().copied())
            .map(|ticker| async move { (ticker.as_str(), self.resolve(ticker).await) })
            .buffer_unordered(self.config.concurrency.max(1));
        let collect = async {
            let mut fetches = std::pin::pin!(fetches);
            while let Some((ticker, outcome)) = fetches.next().await {
                outcomes.insert(ticker, outcome);
            }
        };
        match deadline {
            Some(deadline) => {
                if timeout_at(deadline, collect).await.is_err() {
                    tracing::warn!(limit = ?self.config.timeout, "scan deadline reached");
                }
            }
            None => collect.await,
        }

        // Providers may answer with their own spelling of a symbol
        let mut resolved = BTreeSet::new();
        let mut records = Vec::new();
        let mut unresolved = Vec::new();
        for ticker in &universe {
            match outcomes.remove(ticker.as_str()) {
                Some(Ok(metrics)) => {
                    if resolved.insert(metrics.ticker().to_string()) {
                        records.push(metrics);
                    } else {
                        tracing::warn!(
                            ticker = %ticker,
                            resolved = metrics.ticker(),
                            "duplicate ticker ignored"
                        );
                    }
                }
                Some(Err(err)) => {
                    if err.is_per_ticker() {
                        tracing::warn!(ticker = %ticker, error = %err, "ticker unresolved");
                    } else {
                        tracing::error!(ticker = %ticker, error = %err, "provider failed outside ticker scope");
                    }
                    unresolved.push(UnresolvedTicker::from_error(ticker.as_str(), &err));
                }
                None => {
                    tracing::warn!(ticker = %ticker, "ticker timed out");
                    unresolved.push(UnresolvedTicker::timed_out(ticker.as_str()));
                }
            }
        }

        let report = self.evaluate(sector, &records, rules, unresolved);
        tracing::info!(
            candidates = report.candidates.len(),
            failures = report.failures.len(),
            unresolved = report.unresolved.len(),
            "scan complete"
        );
        report
    }

    fn evaluate(
        &self,
        sector: &str,
        records: &[CanonicalMetrics],
        rules: &CriteriaSet,
        unresolved: Vec<UnresolvedTicker>,
    ) -> ScreeningReport {
        let scorer = CompositeScorer::new(rules, &self.config.weights, records);
        let today = self
            .config
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());

        let mut candidates = Vec::new();
        let mut failures = Vec::new();
        for metrics in records {
            let outcome = self.evaluator.evaluate(metrics, rules);
            let score = scorer.score(metrics.ticker(), &outcome);
            let stale = self
                .config
                .max_record_age_days
                .is_some_and(|days| metrics.is_stale(today, days));
            tracing::debug!(
                ticker = metrics.ticker(),
                passed = outcome.passed,
                score,
                failed = ?outcome.failed_rules,
                "evaluated"
            );

            let result = ScreeningResult {
                ticker: metrics.ticker().to_string(),
                passed: outcome.passed,
                failed_rules: outcome.failed_rules,
                skipped_rules: outcome.skipped_rules,
                score,
                cap_bucket: metrics.market_cap_bucket(),
                stale,
                metrics: metrics.clone(),
            };
            if result.passed {
                candidates.push(result);
            } else {
                failures.push(result);
            }
        }
        candidates.sort_by(ScreeningResult::rank_cmp);
        failures.sort_by(ScreeningResult::rank_cmp);

        ScreeningReport {
            sector: sector.to_string(),
            candidates,
            failures,
            unresolved,
            include_failures: self.config.include_failures,
        }
    }

    async fn resolve(&self, ticker: &str) -> Result<CanonicalMetrics> {
        let raw = self.fetch(ticker).await?;
        self.normalizer.normalize(&raw)
    }

    async fn fetch(&self, ticker: &str) -> Result<RawRecord> {
        match self.provider.fetch_fundamentals(ticker).await {
            Err(err) if err.is_transient() && self.config.retry_transient => {
                tracing::debug!(ticker, error = %err, "retrying transient failure");
                self.provider.fetch_fundamentals(ticker).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fundi_metrics::NormalizerConfig;
    use fundi_traits::{InjectedFailure, Metric, StaticProvider};
    use serde_json::json;

    fn provider() -> StaticProvider {
        StaticProvider::new()
            .with_sector("Technology", ["AAA", "BBB", "CCC"])
            .with_record("AAA", json!({"pe_ratio": 10.0, "roe": 0.20, "market_cap": 1.0e9}))
            .with_record("BBB", json!({"pe_ratio": 20.0, "roe": 0.15, "market_cap": 5.0e9}))
            .with_record("CCC", json!({"pe_ratio": 30.0, "roe": 0.05, "market_cap": 8.0e10}))
    }

    fn rules() -> CriteriaSet {
        CriteriaSet::parse_all(["pe_ratio <= 25", "roe >= 0.1"]).unwrap()
    }

    #[test]
    fn test_normalize_sector_name() {
        assert_eq!(normalize_sector_name("Financials"), "Financial Services");
        assert_eq!(normalize_sector_name("INDUSTRIALS"), "Industrials");
        assert_eq!(normalize_sector_name("consumer cyclical"), "Consumer Cyclical");
        assert_eq!(normalize_sector_name(""), "");
    }

    #[test]
    fn test_default_config() {
        let config = ScreenerConfig::default();
        assert_eq!(config.concurrency, 4);
        assert!(config.retry_transient);
        assert!(!config.include_failures);
        assert!(config.timeout.is_none());
    }

    #[tokio::test]
    async fn test_screen_ranks_candidates() {
        let screener = SectorScreener::new(provider());
        let report = screener.screen("tech", &rules()).await.unwrap();

        assert_eq!(report.sector, "Technology");
        let tickers: Vec<&str> = report.candidates.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAA", "BBB"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].failed_rules, vec!["max_pe_ratio", "min_roe"]);
        assert!(report.unresolved.is_empty());
        assert!(report.candidates[0].score > report.candidates[1].score);
        assert_eq!(
            report.candidates[0].cap_bucket,
            Some(fundi_traits::MarketCapBucket::Small)
        );
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let provider = provider().with_failure("BBB", InjectedFailure::NetworkOnce);
        let screener = SectorScreener::new(provider);
        let report = screener.screen("Technology", &rules()).await.unwrap();

        assert!(report.unresolved.is_empty());
        assert!(report.result("BBB").is_some());
        assert_eq!(screener.provider().call_count("BBB"), 2);
    }

    #[tokio::test]
    async fn test_retry_disabled() {
        let provider = provider().with_failure("BBB", InjectedFailure::NetworkOnce);
        let config = ScreenerConfig {
            retry_transient: false,
            ..ScreenerConfig::default()
        };
        let screener = SectorScreener::with_config(provider, config);
        let report = screener.screen("Technology", &rules()).await.unwrap();

        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].reason, crate::UnresolvedReason::Network);
        assert_eq!(screener.provider().call_count("BBB"), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_not_retried() {
        let provider = provider().with_failure("AAA", InjectedFailure::RateLimited);
        let screener = SectorScreener::new(provider);
        let report = screener.screen("Technology", &rules()).await.unwrap();

        assert_eq!(report.unresolved[0].reason, crate::UnresolvedReason::RateLimited);
        assert_eq!(screener.provider().call_count("AAA"), 1);
        assert_eq!(report.evaluated_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_record_is_unresolved() {
        let provider = provider().with_record("CCC", json!([1, 2, 3]));
        let screener = SectorScreener::new(provider);
        let report = screener.screen("Technology", &rules()).await.unwrap();

        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].ticker, "CCC");
        assert_eq!(report.unresolved[0].reason, crate::UnresolvedReason::Malformed);
    }

    #[tokio::test]
    async fn test_unknown_sector_errors() {
        let screener = SectorScreener::new(provider());
        let err = screener.screen("Utilities", &rules()).await.unwrap_err();
        assert!(matches!(err, FundiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_tickers_screened_once() {
        let screener = SectorScreener::new(provider());
        let tickers: Vec<Symbol> = ["AAA", "AAA", "BBB"].map(String::from).to_vec();
        let report = screener.screen_tickers("Technology", &tickers, &rules()).await;
        assert_eq!(report.evaluated_count(), 2);
        assert_eq!(screener.provider().call_count("AAA"), 1);
    }

    #[tokio::test]
    async fn test_provider_spellings_collapse_to_one_result() {
        let screener = SectorScreener::new(provider());
        let tickers: Vec<Symbol> = ["aaa", "AAA", "bbb"].map(String::from).to_vec();
        let report = screener.screen_tickers("Technology", &tickers, &rules()).await;

        assert_eq!(report.evaluated_count(), 2);
        let tickers: Vec<&str> = report.candidates.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAA", "BBB"]);
        assert!(report.unresolved.is_empty());
        assert!(report.candidates[0].score > report.candidates[1].score);
    }

    #[tokio::test]
    async fn test_custom_normalizer() {
        let provider = StaticProvider::new()
            .with_sector("Energy", ["OIL"])
            .with_record("OIL", json!({"revenue": 100.0, "netIncome": 10.0}));
        let screener = SectorScreener::new(provider).with_normalizer(FundamentalsNormalizer::new(
            NormalizerConfig {
                derive_ratios: false,
            },
        ));
        let rules = CriteriaSet::parse_all(["profit_margin > 0"]).unwrap();
        let report = screener.screen("energy", &rules).await.unwrap();

        let oil = report.result("OIL").unwrap();
        assert_eq!(oil.metrics.get(Metric::ProfitMargin), None);
        assert_eq!(oil.failed_rules, vec!["min_profit_margin"]);
    }

    #[tokio::test]
    async fn test_stale_flag() {
        let provider = StaticProvider::new()
            .with_sector("Energy", ["OLD", "NEW"])
            .with_record("OLD", json!({"pe_ratio": 8.0, "as_of": "2020-12-31"}))
            .with_record("NEW", json!({"pe_ratio": 9.0, "as_of": "2024-12-31"}));
        let config = ScreenerConfig {
            max_record_age_days: Some(365),
            reference_date: Date::from_ymd_opt(2025, 3, 1),
            ..ScreenerConfig::default()
        };
        let screener = SectorScreener::with_config(provider, config);
        let rules = CriteriaSet::parse_all(["pe_ratio <= 15"]).unwrap();
        let report = screener.screen("energy", &rules).await.unwrap();

        assert!(report.result("OLD").unwrap().stale);
        assert!(!report.result("NEW").unwrap().stale);
    }

    #[tokio::test]
    async fn test_sequential_matches_concurrent() {
        let sequential = SectorScreener::with_config(
            provider(),
            ScreenerConfig {
                concurrency: 1,
                include_failures: true,
                ..ScreenerConfig::default()
            },
        );
        let concurrent = SectorScreener::with_config(
            provider(),
            ScreenerConfig {
                concurrency: 8,
                include_failures: true,
                ..ScreenerConfig::default()
            },
        );
        let a = sequential.screen("Technology", &rules()).await.unwrap();
        let b = concurrent.screen("Technology", &rules()).await.unwrap();

        let order = |r: &ScreeningReport| -> Vec<(String, f64)> {
            r.ranked().iter().map(|x| (x.ticker.clone(), x.score)).collect()
        };
        let (oa, ob) = (order(&a), order(&b));
        assert_eq!(oa.len(), 3);
        for ((ta, sa), (tb, sb)) in oa.iter().zip(&ob) {
            assert_eq!(ta, tb);
            assert_relative_eq!(*sa, *sb);
        }
    }

    #[tokio::test]
    async fn test_timeout_reports_slow_tickers() {
        let provider = provider().with_delay("CCC", Duration::from_secs(30));
        let config = ScreenerConfig {
            timeout: Some(Duration::from_millis(200)),
            ..ScreenerConfig::default()
        };
        let screener = SectorScreener::with_config(provider, config);
        let report = screener.screen("Technology", &rules()).await.unwrap();

        assert_eq!(report.evaluated_count(), 2);
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].ticker, "CCC");
        assert_eq!(report.unresolved[0].reason, crate::UnresolvedReason::Timeout);
    }

    #[tokio::test]
    async fn test_timeout_bounds_sector_listing() {
        let provider = provider().with_listing_delay(Duration::from_secs(3600));
        let config = ScreenerConfig {
            timeout: Some(Duration::from_millis(100)),
            ..ScreenerConfig::default()
        };
        let screener = SectorScreener::with_config(provider, config);

        let result = tokio::time::timeout(Duration::from_secs(2), screener.screen("Technology", &rules()))
            .await
            .expect("screen must honour its own deadline");
        assert!(matches!(result, Err(FundiError::DataFetch(_))));
    }

    #[tokio::test]
    async fn test_listing_and_fetches_share_deadline() {
        let provider = provider()
            .with_listing_delay(Duration::from_millis(150))
            .with_delay("AAA", Duration::from_millis(150));
        let config = ScreenerConfig {
            timeout: Some(Duration::from_millis(250)),
            ..ScreenerConfig::default()
        };
        let screener = SectorScreener::with_config(provider, config);
        let report = screener.screen("Technology", &rules()).await.unwrap();

        // AAA alone would fit in 250ms, but not after the listing
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].ticker, "AAA");
        assert_eq!(report.unresolved[0].reason, crate::UnresolvedReason::Timeout);
    }
}
