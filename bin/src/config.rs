//! Provider selection and criteria loading.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use fundi_criteria::{CriteriaRule, CriteriaSet};
use fundi_fmp::FmpClient;
use fundi_screen::ScoreWeights;
use fundi_traits::{DataProvider, Metric, StaticProvider};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Build the provider: a fixture file when given, FMP otherwise.
pub(crate) fn load_provider(data: Option<&Path>) -> Result<Box<dyn DataProvider>> {
    match data {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading fixture {}", path.display()))?;
            let provider = StaticProvider::from_json_str(&text)?;
            tracing::info!(path = %path.display(), "using fixture provider");
            Ok(Box::new(provider))
        }
        None => {
            let client = FmpClient::from_env().context(
                "no --data fixture given and FMP_API_KEY is not set (environment or .env)",
            )?;
            Ok(Box::new(client))
        }
    }
}

/// On-disk criteria file, JSON or TOML.
///
/// ```toml
/// [thresholds]
/// max_pe_ratio = 15
/// min_roe = 0.10
///
/// [[rules]]
/// metric = "dividend_yield"
/// comparator = ">"
/// threshold = 0
/// skip_if_missing = true
///
/// [weights]
/// roe = 2.0
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CriteriaFile {
    /// `max_<metric>` / `min_<metric>` thresholds
    #[serde(default)]
    pub(crate) thresholds: BTreeMap<String, f64>,
    /// Explicit rules
    #[serde(default)]
    pub(crate) rules: Vec<CriteriaRule>,
    /// Metric name to score weight
    #[serde(default)]
    pub(crate) weights: BTreeMap<String, f64>,
}

impl CriteriaFile {
    /// Read a criteria file; the extension picks the format.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading criteria file {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        } else {
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        }
    }
}

/// Criteria sources gathered from the command line.
#[derive(Debug, Default)]
pub(crate) struct CriteriaSources<'a> {
    pub(crate) file: Option<&'a Path>,
    pub(crate) thresholds: &'a [String],
    pub(crate) rules: &'a [String],
    pub(crate) weights: &'a [String],
    pub(crate) small_caps: bool,
}

/// Assemble the rule set and weights.
///
/// Order: preset, file thresholds, file rules, `--threshold` flags, `--rule` flags.
pub(crate) fn build_criteria(sources: &CriteriaSources<'_>) -> Result<(CriteriaSet, ScoreWeights)> {
    let file = match sources.file {
        Some(path) => CriteriaFile::load(path)?,
        None => CriteriaFile::default(),
    };

    let mut set = if sources.small_caps {
        CriteriaSet::small_cap_value()
    } else {
        CriteriaSet::default()
    };

    let file_thresholds = CriteriaSet::from_thresholds(file.thresholds.iter().map(|(k, v)| (k, *v)))?;
    let flag_thresholds = CriteriaSet::from_thresholds(
        sources
            .thresholds
            .iter()
            .map(|kv| parse_key_value(kv))
            .collect::<Result<Vec<_>>>()?,
    )?;
    let flag_rules = CriteriaSet::parse_all(sources.rules)?;

    let rules = file_thresholds
        .rules()
        .iter()
        .chain(&file.rules)
        .chain(flag_thresholds.rules())
        .chain(flag_rules.rules());
    for rule in rules {
        set = set.with_rule(rule.clone())?;
    }

    if set.is_empty() {
        bail!("no criteria given; use --rule, --threshold, --criteria or --small-caps");
    }

    let mut weights = ScoreWeights::new();
    let flag_weights = sources
        .weights
        .iter()
        .map(|kv| parse_key_value(kv))
        .collect::<Result<Vec<_>>>()?;
    for (name, weight) in file.weights.into_iter().chain(flag_weights) {
        let metric: Metric = name.parse()?;
        weights = weights.with(metric, weight)?;
    }

    Ok((set, weights))
}

/// Parse `key=value` with a numeric value.
pub(crate) fn parse_key_value(text: &str) -> Result<(String, f64)> {
    let Some((key, value)) = text.split_once('=') else {
        bail!("expected key=value, got '{text}'");
    };
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", value.trim()))?;
    Ok((key.trim().to_string(), value))
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date_str}', expected YYYY-MM-DD"))
}
