//! Single threshold rules.

use fundi_traits::{FundiError, Metric, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison applied between a metric value and a rule threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Comparator {
    /// `value <= threshold`
    Le,
    /// `value >= threshold`
    Ge,
    /// `value < threshold`
    Lt,
    /// `value > threshold`
    Gt,
    /// `value == threshold`, exact float equality
    Eq,
}

impl Comparator {
    /// Operator symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Eq => "==",
        }
    }

    /// Apply the comparison.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn apply(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Le => value <= threshold,
            Self::Ge => value >= threshold,
            Self::Lt => value < threshold,
            Self::Gt => value > threshold,
            Self::Eq => value == threshold,
        }
    }

    /// Prefix used for generated rule names.
    const fn name_prefix(&self) -> &'static str {
        match self {
            Self::Le | Self::Lt => "max",
            Self::Ge | Self::Gt => "min",
            Self::Eq => "eq",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparator {
    type Err = FundiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "<=" | "≤" | "le" | "lte" => Ok(Self::Le),
            ">=" | "≥" | "ge" | "gte" => Ok(Self::Ge),
            "<" | "lt" => Ok(Self::Lt),
            ">" | "gt" => Ok(Self::Gt),
            "==" | "=" | "eq" => Ok(Self::Eq),
            _ => Err(FundiError::InvalidRule(format!("unknown comparator '{s}'"))),
        }
    }
}

impl TryFrom<String> for Comparator {
    type Error = FundiError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Comparator> for String {
    fn from(value: Comparator) -> Self {
        value.symbol().to_string()
    }
}

/// A named threshold rule over one canonical metric.
///
/// Rules are validated on construction: the metric must be a known numeric
/// metric and the threshold must be finite. Deserialization goes through
/// [`RuleSpec`] and applies the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleSpec", into = "RuleSpec")]
pub struct CriteriaRule {
    name: String,
    metric: Metric,
    comparator: Comparator,
    threshold: f64,
    optional: bool,
    skip_if_missing: bool,
}

impl CriteriaRule {
    /// Create a rule from a metric name or alias.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] for an empty name, an unknown or
    /// non-numeric metric, or a non-finite threshold.
    pub fn new(
        name: impl Into<String>,
        metric: &str,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<Self> {
        let metric: Metric = metric.parse()?;
        Self::with_name(name, metric, comparator, threshold)
    }

    /// Create a rule over a typed metric with a generated name such as
    /// `max_pe_ratio` or `min_roe`.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] for a non-finite threshold.
    pub fn for_metric(metric: Metric, comparator: Comparator, threshold: f64) -> Result<Self> {
        Self::with_name(default_name(metric, comparator), metric, comparator, threshold)
    }

    /// Create a named rule over a typed metric.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::InvalidRule`] for an empty name or a non-finite threshold.
    pub fn with_name(
        name: impl Into<String>,
        metric: Metric,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FundiError::InvalidRule("rule name must not be empty".into()));
        }
        if !threshold.is_finite() {
            return Err(FundiError::InvalidRule(format!(
                "rule '{name}': threshold must be finite, got {threshold}"
            )));
        }
        Ok(Self {
            name,
            metric,
            comparator,
            threshold,
            optional: false,
            skip_if_missing: false,
        })
    }

    /// Mark the rule as optional: a failure is reported but does not reject
    /// the ticker.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Skip the rule when the metric is absent instead of failing it.
    #[must_use]
    pub const fn skip_if_missing(mut self) -> Self {
        self.skip_if_missing = true;
        self
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Metric the rule reads.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Comparison operator.
    #[must_use]
    pub const fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Threshold value.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a failure of this rule still lets the ticker pass.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether an absent metric skips the rule rather than failing it.
    #[must_use]
    pub const fn skips_if_missing(&self) -> bool {
        self.skip_if_missing
    }

    /// Check a present metric value against the threshold.
    #[must_use]
    pub fn check(&self, value: f64) -> bool {
        self.comparator.apply(value, self.threshold)
    }
}

impl fmt::Display for CriteriaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {}",
            self.name, self.metric, self.comparator, self.threshold
        )?;
        if self.optional {
            f.write_str(" (optional)")?;
        }
        if self.skip_if_missing {
            f.write_str(" (skip if missing)")?;
        }
        Ok(())
    }
}

/// Generated rule name, e.g. `max_pe_ratio`.
#[must_use]
pub fn default_name(metric: Metric, comparator: Comparator) -> String {
    format!("{}_{}", comparator.name_prefix(), metric.as_str())
}

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '≤', '≥'];

/// Parses rule expressions such as `pe_ratio <= 15`, `roe >= 10%` or
/// `dividend_yield > 0 ?~`.
///
/// A trailing `?` marks the rule optional and a trailing `~` skips it when
/// the metric is missing. The rule gets a generated name.
impl FromStr for CriteriaRule {
    type Err = FundiError;

    fn from_str(s: &str) -> Result<Self> {
        let mut expr = s.trim();
        let mut optional = false;
        let mut skip = false;
        loop {
            if let Some(rest) = expr.strip_suffix('?') {
                optional = true;
                expr = rest.trim_end();
            } else if let Some(rest) = expr.strip_suffix('~') {
                skip = true;
                expr = rest.trim_end();
            } else {
                break;
            }
        }

        let Some(start) = expr.find(OPERATOR_CHARS) else {
            return Err(FundiError::InvalidRule(format!(
                "rule '{s}' has no comparison operator"
            )));
        };
        let op_len: usize = expr[start..]
            .chars()
            .take_while(|c| OPERATOR_CHARS.contains(c))
            .map(char::len_utf8)
            .sum();
        let metric_str = expr[..start].trim();
        let comparator: Comparator = expr[start..start + op_len].parse()?;
        let threshold = parse_threshold(expr[start + op_len..].trim())
            .ok_or_else(|| FundiError::InvalidRule(format!("rule '{s}' has no numeric threshold")))?;

        if metric_str.is_empty() {
            return Err(FundiError::InvalidRule(format!("rule '{s}' names no metric")));
        }
        let metric: Metric = metric_str.parse()?;
        let mut rule = Self::for_metric(metric, comparator, threshold)?;
        rule.optional = optional;
        rule.skip_if_missing = skip;
        Ok(rule)
    }
}

fn parse_threshold(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '_').collect();
    if let Some(pct) = cleaned.strip_suffix('%') {
        return pct.trim().parse::<f64>().ok().map(|v| v / 100.0);
    }
    cleaned.parse().ok()
}

/// Serialized shape of a rule, as found in criteria files.
///
/// ```json
/// {"metric": "pe_ratio", "comparator": "<=", "threshold": 15}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule name; generated from metric and comparator when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Metric name or alias
    pub metric: String,

    /// Comparator symbol or mnemonic (`<=`, `ge`, ...)
    #[serde(alias = "op")]
    pub comparator: String,

    /// Threshold value
    pub threshold: f64,

    /// Failure does not reject the ticker
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    /// Absent metric skips the rule
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_if_missing: bool,
}

impl TryFrom<RuleSpec> for CriteriaRule {
    type Error = FundiError;

    fn try_from(spec: RuleSpec) -> Result<Self> {
        let metric: Metric = spec.metric.parse()?;
        let comparator: Comparator = spec.comparator.parse()?;
        let name = spec
            .name
            .unwrap_or_else(|| default_name(metric, comparator));
        let mut rule = Self::with_name(name, metric, comparator, spec.threshold)?;
        rule.optional = spec.optional;
        rule.skip_if_missing = spec.skip_if_missing;
        Ok(rule)
    }
}

impl From<CriteriaRule> for RuleSpec {
    fn from(rule: CriteriaRule) -> Self {
        Self {
            name: Some(rule.name),
            metric: rule.metric.as_str().to_string(),
            comparator: rule.comparator.symbol().to_string(),
            threshold: rule.threshold,
            optional: rule.optional,
            skip_if_missing: rule.skip_if_missing,
        }
    }
}
