//! Ordered collections of rules.

use crate::rule::{Comparator, CriteriaRule};
use fundi_traits::{FundiError, Metric, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Maximum market cap for the small-cap value preset.
pub const SMALL_CAP_MAX_MARKET_CAP: f64 = 2e9;
/// Minimum return on equity for the small-cap value preset.
pub const SMALL_CAP_MIN_ROE: f64 = 0.10;
/// Maximum trailing P/E for the small-cap value preset.
pub const SMALL_CAP_MAX_PE: f64 = 15.0;

/// An ordered set of uniquely named rules.
///
/// Evaluation and reporting follow declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CriteriaRule>", into = "Vec<CriteriaRule>")]
pub struct CriteriaSet {
    rules: Vec<CriteriaRule>,
}

impl CriteriaSet {
    /// Build a set from validated rules.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] if two rules share a name.
    pub fn new(rules: Vec<CriteriaRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(FundiError::InvalidRule(format!(
                    "duplicate rule name '{}'",
                    rule.name()
                )));
            }
        }
        Ok(Self { rules })
    }

    /// Parse one rule expression per item, e.g. `["pe_ratio <= 15", "roe >= 0.1"]`.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] for the first unparsable expression
    /// or a duplicate generated name.
    pub fn parse_all<I, S>(expressions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = expressions
            .into_iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Self::new(rules)
    }

    /// Build a set from `max_<metric>` / `min_<metric>` threshold keys.
    ///
    /// `max_` keys become `<=` rules and `min_` keys become `>=` rules. The key
    /// itself is used as the rule name, so `max_debt_equity` stays
    /// `max_debt_equity` while reading [`Metric::DebtToEquity`].
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] for a key without a `max_`/`min_`
    /// prefix, an unknown or non-numeric metric, or a non-finite value.
    pub fn from_thresholds<I, K>(thresholds: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut rules = Vec::new();
        for (key, value) in thresholds {
            let key = key.as_ref().trim();
            let (comparator, metric) = if let Some(metric) = key.strip_prefix("max_") {
                (Comparator::Le, metric)
            } else if let Some(metric) = key.strip_prefix("min_") {
                (Comparator::Ge, metric)
            } else {
                return Err(FundiError::InvalidRule(format!(
                    "threshold key '{key}' must start with 'max_' or 'min_'"
                )));
            };
            rules.push(CriteriaRule::new(key, metric, comparator, value)?);
        }
        Self::new(rules)
    }

    /// Small-cap value preset: a positive market cap up to $2B, ROE of at
    /// least 10%, trailing P/E up to 15, and positive P/E and profit margin.
    #[must_use]
    pub fn small_cap_value() -> Self {
        Self::small_cap_value_with(SMALL_CAP_MAX_MARKET_CAP, SMALL_CAP_MIN_ROE, SMALL_CAP_MAX_PE)
            .unwrap_or_default()
    }

    /// Small-cap value rules with custom limits.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] if a limit is not finite.
    pub fn small_cap_value_with(max_market_cap: f64, min_roe: f64, max_pe: f64) -> Result<Self> {
        Self::new(vec![
            CriteriaRule::for_metric(Metric::MarketCap, Comparator::Le, max_market_cap)?,
            CriteriaRule::with_name("positive_market_cap", Metric::MarketCap, Comparator::Gt, 0.0)?,
            CriteriaRule::for_metric(Metric::Roe, Comparator::Ge, min_roe)?,
            CriteriaRule::for_metric(Metric::PeRatio, Comparator::Le, max_pe)?,
            CriteriaRule::with_name("positive_pe_ratio", Metric::PeRatio, Comparator::Gt, 0.0)?,
            CriteriaRule::with_name(
                "positive_profit_margin",
                Metric::ProfitMargin,
                Comparator::Gt,
                0.0,
            )?,
        ])
    }

    /// Append a rule, keeping names unique.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] if the name is already taken.
    pub fn with_rule(mut self, rule: CriteriaRule) -> Result<Self> {
        if self.get(rule.name()).is_some() {
            return Err(FundiError::InvalidRule(format!(
                "duplicate rule name '{}'",
                rule.name()
            )));
        }
        self.rules.push(rule);
        Ok(self)
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[CriteriaRule] {
        &self.rules
    }

    /// Look up a rule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CriteriaRule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// Iterate rules in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, CriteriaRule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct metrics referenced by the set.
    #[must_use]
    pub fn metrics(&self) -> BTreeSet<Metric> {
        self.rules.iter().map(CriteriaRule::metric).collect()
    }

    /// Number of rules referencing `metric`.
    #[must_use]
    pub fn rules_referencing(&self, metric: Metric) -> usize {
        self.rules.iter().filter(|r| r.metric() == metric).count()
    }
}

impl TryFrom<Vec<CriteriaRule>> for CriteriaSet {
    type Error = FundiError;

    fn try_from(rules: Vec<CriteriaRule>) -> Result<Self> {
        Self::new(rules)
    }
}

impl From<CriteriaSet> for Vec<CriteriaRule> {
    fn from(set: CriteriaSet) -> Self {
        set.rules
    }
}

impl<'a> IntoIterator for &'a CriteriaSet {
    type Item = &'a CriteriaRule;
    type IntoIter = std::slice::Iter<'a, CriteriaRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
