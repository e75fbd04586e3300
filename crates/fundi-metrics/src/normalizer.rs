//! Raw provider record to canonical metrics.

use crate::fields::{
    self, AS_OF_FIELDS, NET_INCOME_FIELDS, PRIOR_REVENUE_FIELDS, REVENUE_FIELDS, SECTOR_FIELDS,
    SYMBOL_FIELDS, TOTAL_DEBT_FIELDS, TOTAL_EQUITY_FIELDS,
};
use fundi_traits::{CanonicalMetrics, Date, FundiError, Metric, RawRecord, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

type Fields = Map<String, Value>;

/// Configuration for the fundamentals normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Fill profit margin, ROE and debt-to-equity from statement lines when the
    /// provider does not report the ratio directly (default: true).
    pub derive_ratios: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            derive_ratios: true,
        }
    }
}

/// Converts raw provider payloads into [`CanonicalMetrics`].
///
/// Missing and unparsable fields both become absent metrics. The only error is
/// [`FundiError::MalformedRecord`], for payloads that are not records at all.
///
/// # Example
///
/// ```
/// use fundi_metrics::FundamentalsNormalizer;
/// use fundi_traits::{Metric, RawRecord};
/// use serde_json::json;
///
/// let raw = RawRecord::new("ACME", json!({
///     "marketCap": 1.2e9,
///     "returnOnEquity": "14.5%",
///     "revenue": 550.0,
///     "priorRevenue": 500.0,
/// }));
///
/// let metrics = FundamentalsNormalizer::default().normalize(&raw).unwrap();
/// assert_eq!(metrics.get(Metric::MarketCap), Some(1.2e9));
/// assert!((metrics.get(Metric::Roe).unwrap() - 0.145).abs() < 1e-12);
/// assert!((metrics.get(Metric::RevenueGrowth).unwrap() - 0.1).abs() < 1e-12);
/// assert_eq!(metrics.get(Metric::PeRatio), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FundamentalsNormalizer {
    config: NormalizerConfig,
}

impl FundamentalsNormalizer {
    /// Create a normalizer with the given configuration.
    #[must_use]
    pub const fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize one raw record.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::MalformedRecord`] if the payload is not a mapping,
    /// or if no ticker can be determined for it.
    pub fn normalize(&self, raw: &RawRecord) -> Result<CanonicalMetrics> {
        let fields = raw.fields().ok_or_else(|| {
            FundiError::MalformedRecord(format!(
                "{}: expected a record, got {}",
                display_ticker(&raw.ticker),
                shape(&raw.payload)
            ))
        })?;

        let ticker = if raw.ticker.trim().is_empty() {
            first_text(fields, SYMBOL_FIELDS).ok_or_else(|| {
                FundiError::MalformedRecord("record has no ticker symbol".to_string())
            })?
        } else {
            raw.ticker.trim().to_string()
        };

        let mut values: Vec<(Metric, f64)> = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            if let Some(value) = lookup(&ticker, fields, fields::aliases(metric)) {
                values.push((metric, value));
            }
        }

        let has = |values: &[(Metric, f64)], metric: Metric| values.iter().any(|(m, _)| *m == metric);

        if !has(&values, Metric::RevenueGrowth)
            && let Some(growth) = revenue_growth(&ticker, fields)
        {
            values.push((Metric::RevenueGrowth, growth));
        }

        if self.config.derive_ratios {
            let derived = derive_ratios(&ticker, fields);
            for (metric, value) in derived {
                if !has(&values, metric) {
                    values.push((metric, value));
                }
            }
        }

        let mut record = CanonicalMetrics::from_values(ticker.clone(), values);
        if let Some(sector) = first_text(fields, SECTOR_FIELDS) {
            record = record.with_sector(sector);
        }
        if let Some(as_of) = first_text(fields, AS_OF_FIELDS).and_then(|s| parse_date(&s)) {
            record = record.with_as_of(as_of);
        }

        debug!(
            ticker = %ticker,
            present = record.present_count(),
            total = Metric::ALL.len(),
            "normalized record"
        );
        Ok(record)
    }
}

/// (current - prior) / prior, absent when either side is missing or prior is zero.
pub fn growth_rate(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    let (current, prior) = (current?, prior?);
    if prior == 0.0 {
        return None;
    }
    let growth = (current - prior) / prior;
    growth.is_finite().then_some(growth)
}

/// Coerce a JSON value into a number.
///
/// Numbers pass through. Strings are trimmed, stripped of `$` and thousands
/// separators, and a trailing `%` divides by 100. Everything else, including
/// non-finite results, is absent.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let text = s.trim();
            let (text, percent) = match text.strip_suffix('%') {
                Some(rest) => (rest.trim_end(), true),
                None => (text, false),
            };
            let cleaned: String = text.chars().filter(|c| !matches!(c, '$' | ',')).collect();
            if cleaned.is_empty() {
                return None;
            }
            let parsed: f64 = cleaned.parse().ok()?;
            if percent { parsed / 100.0 } else { parsed }
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn lookup(ticker: &str, fields: &Fields, names: &[&str]) -> Option<f64> {
    for name in names {
        let Some(value) = fields.get(*name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        match coerce_number(value) {
            Some(number) => return Some(number),
            None => debug!(ticker, field = *name, value = %value, "dropping unparsable value"),
        }
    }
    None
}

fn revenue_growth(ticker: &str, fields: &Fields) -> Option<f64> {
    let current = lookup(ticker, fields, REVENUE_FIELDS);
    let prior = lookup(ticker, fields, PRIOR_REVENUE_FIELDS);
    growth_rate(current, prior)
}

fn derive_ratios(ticker: &str, fields: &Fields) -> Vec<(Metric, f64)> {
    let revenue = lookup(ticker, fields, REVENUE_FIELDS);
    let net_income = lookup(ticker, fields, NET_INCOME_FIELDS);
    let equity = lookup(ticker, fields, TOTAL_EQUITY_FIELDS);
    let debt = lookup(ticker, fields, TOTAL_DEBT_FIELDS);

    let mut derived = Vec::new();
    if let (Some(ni), Some(rev)) = (net_income, revenue)
        && rev != 0.0
    {
        derived.push((Metric::ProfitMargin, ni / rev));
    }
    if let Some(eq) = equity.filter(|e| *e > 0.0) {
        if let Some(ni) = net_income {
            derived.push((Metric::Roe, ni / eq));
        }
        if let Some(d) = debt {
            derived.push((Metric::DebtToEquity, d / eq));
        }
    }
    derived
}

fn first_text(fields: &Fields, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_date(text: &str) -> Option<Date> {
    let day = text.get(..10).unwrap_or(text);
    Date::parse_from_str(day, "%Y-%m-%d").ok()
}

const fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a record",
    }
}

fn display_ticker(ticker: &str) -> &str {
    if ticker.is_empty() { "<unknown>" } else { ticker }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn normalize(payload: Value) -> CanonicalMetrics {
        FundamentalsNormalizer::default()
            .normalize(&RawRecord::new("TEST", payload))
            .unwrap()
    }

    #[test]
    fn test_maps_provider_fields() {
        let m = normalize(json!({
            "trailingPE": 12.5,
            "marketCap": 1.5e9,
            "returnOnEquity": 0.15,
            "debtEquityRatio": 0.3,
        }));
        assert_eq!(m.get(Metric::PeRatio), Some(12.5));
        assert_eq!(m.get(Metric::MarketCap), Some(1.5e9));
        assert_eq!(m.get(Metric::Roe), Some(0.15));
        assert_eq!(m.get(Metric::DebtToEquity), Some(0.3));
        assert_eq!(m.ticker(), "TEST");
    }

    #[test]
    fn test_every_metric_key_present() {
        let m = normalize(json!({}));
        assert_eq!(m.iter().count(), Metric::ALL.len());
        assert!(m.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_percent_strings() {
        let m = normalize(json!({"profitMargins": "12%", "dividendYield": " 2.5 % "}));
        assert_relative_eq!(m.get(Metric::ProfitMargin).unwrap(), 0.12);
        assert_relative_eq!(m.get(Metric::DividendYield).unwrap(), 0.025);
    }

    #[test]
    fn test_currency_strings() {
        let m = normalize(json!({"marketCap": "$1,250,000,000"}));
        assert_eq!(m.get(Metric::MarketCap), Some(1.25e9));
    }

    #[test]
    fn test_unparsable_text_is_absent() {
        let m = normalize(json!({
            "trailingPE": "N/A",
            "returnOnEquity": "",
            "marketCap": true,
            "debtToEquity": [1, 2],
            "currentRatio": "Infinity",
        }));
        assert_eq!(m.get(Metric::PeRatio), None);
        assert_eq!(m.get(Metric::Roe), None);
        assert_eq!(m.get(Metric::MarketCap), None);
        assert_eq!(m.get(Metric::DebtToEquity), None);
        assert_eq!(m.get(Metric::CurrentRatio), None);
    }

    #[test]
    fn test_null_is_absent_not_zero() {
        let m = normalize(json!({"trailingPE": null}));
        assert_eq!(m.get(Metric::PeRatio), None);
    }

    #[test]
    fn test_later_alias_used_when_first_unusable() {
        let m = normalize(json!({"peRatio": "n/a", "trailingPE": 9.0}));
        assert_eq!(m.get(Metric::PeRatio), Some(9.0));
    }

    #[test]
    fn test_revenue_growth_derived() {
        let m = normalize(json!({"revenue": 120.0, "priorRevenue": 100.0}));
        assert_relative_eq!(m.get(Metric::RevenueGrowth).unwrap(), 0.2);
    }

    #[test]
    fn test_revenue_growth_zero_prior_is_absent() {
        let m = normalize(json!({"revenue": 120.0, "priorRevenue": 0.0}));
        assert_eq!(m.get(Metric::RevenueGrowth), None);
    }

    #[test]
    fn test_revenue_growth_missing_side_is_absent() {
        let m = normalize(json!({"revenue": 120.0}));
        assert_eq!(m.get(Metric::RevenueGrowth), None);

        let m = normalize(json!({"priorRevenue": 100.0, "revenue": "??"}));
        assert_eq!(m.get(Metric::RevenueGrowth), None);
    }

    #[test]
    fn test_direct_growth_takes_precedence() {
        let m = normalize(json!({"revenueGrowth": 0.05, "revenue": 200.0, "priorRevenue": 100.0}));
        assert_relative_eq!(m.get(Metric::RevenueGrowth).unwrap(), 0.05);
    }

    #[test]
    fn test_derived_ratios() {
        let m = normalize(json!({
            "revenue": 500.0,
            "netIncome": 50.0,
            "totalStockholdersEquity": 250.0,
            "totalDebt": 100.0,
        }));
        assert_relative_eq!(m.get(Metric::ProfitMargin).unwrap(), 0.1);
        assert_relative_eq!(m.get(Metric::Roe).unwrap(), 0.2);
        assert_relative_eq!(m.get(Metric::DebtToEquity).unwrap(), 0.4);
    }

    #[test]
    fn test_derived_ratios_guard_non_positive_equity() {
        let m = normalize(json!({"netIncome": 50.0, "totalEquity": 0.0, "totalDebt": 10.0}));
        assert_eq!(m.get(Metric::Roe), None);
        assert_eq!(m.get(Metric::DebtToEquity), None);
    }

    #[test]
    fn test_derivation_can_be_disabled() {
        let normalizer = FundamentalsNormalizer::new(NormalizerConfig {
            derive_ratios: false,
        });
        let m = normalizer
            .normalize(&RawRecord::new("X", json!({"revenue": 10.0, "netIncome": 1.0})))
            .unwrap();
        assert_eq!(m.get(Metric::ProfitMargin), None);
    }

    #[test]
    fn test_metadata() {
        let m = normalize(json!({"sector": "Healthcare", "date": "2024-06-30T00:00:00"}));
        assert_eq!(m.sector(), Some("Healthcare"));
        assert_eq!(m.as_of(), Date::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn test_non_record_payloads_are_malformed() {
        let normalizer = FundamentalsNormalizer::default();
        for payload in [Value::Null, json!(42), json!("AAPL"), json!([1, 2, 3])] {
            let result = normalizer.normalize(&RawRecord::new("BAD", payload));
            assert!(matches!(result, Err(FundiError::MalformedRecord(_))));
        }
    }

    #[test]
    fn test_ticker_from_payload_when_missing() {
        let normalizer = FundamentalsNormalizer::default();
        let m = normalizer
            .normalize(&RawRecord::new("", json!({"symbol": "ACME"})))
            .unwrap();
        assert_eq!(m.ticker(), "ACME");

        let result = normalizer.normalize(&RawRecord::new(" ", json!({})));
        assert!(matches!(result, Err(FundiError::MalformedRecord(_))));
    }

    #[test]
    fn test_growth_rate_helper() {
        assert_eq!(growth_rate(Some(1.0), None), None);
        assert_eq!(growth_rate(Some(1.0), Some(0.0)), None);
        assert_relative_eq!(growth_rate(Some(90.0), Some(100.0)).unwrap(), -0.1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn digitless_text_is_absent(text in "[^0-9]{0,24}") {
                let raw = RawRecord::new("TEST", json!({"peRatio": text, "roe": 0.1}));
                let m = FundamentalsNormalizer::default().normalize(&raw);
                prop_assert!(m.is_ok());
                let m = m.unwrap();
                prop_assert_eq!(m.get(Metric::PeRatio), None);
                prop_assert_eq!(m.get(Metric::Roe), Some(0.1));
            }

            #[test]
            fn any_text_matches_coercion(text in ".{0,24}") {
                let raw = RawRecord::new("TEST", json!({"marketCap": text.clone()}));
                let m = FundamentalsNormalizer::default().normalize(&raw);
                prop_assert!(m.is_ok());
                prop_assert_eq!(
                    m.unwrap().get(Metric::MarketCap),
                    coerce_number(&Value::String(text))
                );
            }
        }
    }
}
