//! Composite scoring across a screened universe.

use fundi_criteria::{CriteriaSet, EvaluationOutcome};
use fundi_traits::{CanonicalMetrics, FundiError, Metric, Result, Symbol, stats::standardize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Per-metric weights for the composite score.
///
/// Metrics without an explicit weight count 1.0. A metric's weight is split
/// evenly across the rules that reference it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Metric, f64>", into = "BTreeMap<Metric, f64>")]
pub struct ScoreWeights {
    weights: BTreeMap<Metric, f64>,
}

impl ScoreWeights {
    /// Weights with every metric at 1.0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit weight for a metric.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] for a negative or non-finite weight.
    pub fn with(mut self, metric: Metric, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(FundiError::InvalidRule(format!(
                "weight for {metric} must be finite and non-negative, got {weight}"
            )));
        }
        self.weights.insert(metric, weight);
        Ok(self)
    }

    /// Weight of a metric.
    #[must_use]
    pub fn weight(&self, metric: Metric) -> f64 {
        self.weights.get(&metric).copied().unwrap_or(1.0)
    }

    /// Effective weight of one rule over `metric` in `rules`.
    #[must_use]
    pub fn rule_weight(&self, metric: Metric, rules: &CriteriaSet) -> f64 {
        match rules.rules_referencing(metric) {
            0 => 0.0,
            n => self.weight(metric) / n as f64,
        }
    }
}

impl TryFrom<BTreeMap<Metric, f64>> for ScoreWeights {
    type Error = FundiError;

    fn try_from(weights: BTreeMap<Metric, f64>) -> Result<Self> {
        weights
            .into_iter()
            .try_fold(Self::new(), |acc, (metric, weight)| acc.with(metric, weight))
    }
}

impl From<ScoreWeights> for BTreeMap<Metric, f64> {
    fn from(weights: ScoreWeights) -> Self {
        weights.weights
    }
}

/// Scores evaluated tickers against each other.
///
/// Each metric referenced by the rule set is standardized across every
/// resolved ticker that reports it, with the sign flipped for lower-is-better
/// metrics so that a positive z-score is always favourable.
#[derive(Debug)]
pub struct CompositeScorer<'a> {
    rules: &'a CriteriaSet,
    weights: &'a ScoreWeights,
    zscores: BTreeMap<Metric, BTreeMap<Symbol, f64>>,
}

impl<'a> CompositeScorer<'a> {
    /// Build cross-sectional z-scores for the metrics in `rules`.
    #[must_use]
    pub fn new(rules: &'a CriteriaSet, weights: &'a ScoreWeights, records: &[CanonicalMetrics]) -> Self {
        let mut zscores = BTreeMap::new();
        for metric in rules.metrics() {
            let (tickers, values): (Vec<&str>, Vec<f64>) = records
                .iter()
                .filter_map(|r| r.get(metric).map(|v| (r.ticker(), v)))
                .unzip();
            let z = standardize(&values);
            let direction = metric.direction();
            let column = tickers
                .into_iter()
                .zip(z)
                .map(|(t, z)| (t.to_string(), direction.orient(z)))
                .collect();
            zscores.insert(metric, column);
        }
        Self {
            rules,
            weights,
            zscores,
        }
    }

    /// Direction-adjusted z-score of a ticker's metric, if it reported one.
    #[must_use]
    pub fn zscore(&self, metric: Metric, ticker: &str) -> Option<f64> {
        self.zscores.get(&metric)?.get(ticker).copied()
    }

    /// Composite score of one ticker.
    ///
    /// Passing rules contribute their weighted z-score; every rule that was
    /// not skipped contributes its weight to the denominator. Returns 0.0 when
    /// no rule carries weight.
    #[must_use]
    pub fn score(&self, ticker: &str, outcome: &EvaluationOutcome) -> f64 {
        let passed: HashSet<&str> = outcome.passed_rules.iter().map(String::as_str).collect();
        let skipped: HashSet<&str> = outcome.skipped_rules.iter().map(String::as_str).collect();

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for rule in self.rules {
            if skipped.contains(rule.name()) {
                continue;
            }
            let weight = self.weights.rule_weight(rule.metric(), self.rules);
            denominator += weight;
            if passed.contains(rule.name()) {
                numerator += weight * self.zscore(rule.metric(), ticker).unwrap_or(0.0);
            }
        }

        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }
}
