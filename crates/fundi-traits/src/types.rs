//! Common types used throughout fundi.
//!
//! The two record shapes live here: [`RawRecord`] is whatever the provider sent,
//! [`CanonicalMetrics`] is what everything downstream of the normalizer sees.

use crate::Metric;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A ticker symbol such as "AAPL".
pub type Symbol = String;

/// Untyped provider payload for one ticker.
///
/// The payload is a JSON value, which is the tagged union of every shape a
/// provider can hand back. Only `Value::Object` is a well-formed record; the
/// normalizer rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Ticker the payload was fetched for.
    pub ticker: Symbol,
    /// Provider-specific fields.
    pub payload: serde_json::Value,
}

impl RawRecord {
    /// Create a raw record.
    pub fn new(ticker: impl Into<Symbol>, payload: serde_json::Value) -> Self {
        Self {
            ticker: ticker.into(),
            payload,
        }
    }

    /// The field map, if the payload is a record at all.
    #[must_use]
    pub fn fields(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.payload.as_object()
    }
}

/// Normalized fundamentals for one ticker.
///
/// Every [`Metric`] is always present as a key; a value of `None` means the
/// provider had no usable data. Values are never NaN or infinite. There is no
/// mutating API: a record is fixed once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalMetrics {
    ticker: Symbol,
    sector: Option<String>,
    as_of: Option<Date>,
    values: BTreeMap<Metric, Option<f64>>,
}

impl CanonicalMetrics {
    /// A record for `ticker` with every metric absent.
    pub fn new(ticker: impl Into<Symbol>) -> Self {
        Self {
            ticker: ticker.into(),
            sector: None,
            as_of: None,
            values: Metric::ALL.iter().map(|m| (*m, None)).collect(),
        }
    }

    /// Build a record from known values. Non-finite values are dropped.
    pub fn from_values<I>(ticker: impl Into<Symbol>, values: I) -> Self
    where
        I: IntoIterator<Item = (Metric, f64)>,
    {
        let mut record = Self::new(ticker);
        for (metric, value) in values {
            if value.is_finite() {
                record.values.insert(metric, Some(value));
            }
        }
        record
    }

    /// Attach the sector reported by the provider.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Attach the reporting date of the underlying data.
    #[must_use]
    pub fn with_as_of(mut self, as_of: Date) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Ticker symbol.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Sector reported by the provider, if any.
    #[must_use]
    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    /// Reporting date of the data, if known.
    #[must_use]
    pub const fn as_of(&self) -> Option<Date> {
        self.as_of
    }

    /// Value of a metric, `None` when unavailable.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied().flatten()
    }

    /// Whether a metric has a value.
    #[must_use]
    pub fn is_present(&self, metric: Metric) -> bool {
        self.get(metric).is_some()
    }

    /// All metrics in canonical order with their optional values.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    /// Number of metrics with a value.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }

    /// Size bucket derived from market cap.
    #[must_use]
    pub fn market_cap_bucket(&self) -> Option<MarketCapBucket> {
        self.get(Metric::MarketCap)
            .map(MarketCapBucket::from_market_cap)
    }

    /// Whether the record is older than `max_age_days` relative to `today`.
    ///
    /// Records without a reporting date are never considered stale.
    #[must_use]
    pub fn is_stale(&self, today: Date, max_age_days: i64) -> bool {
        self.as_of
            .is_some_and(|d| (today - d).num_days() > max_age_days)
    }
}

/// Market-capitalization size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapBucket {
    /// Below $300M.
    Micro,
    /// $300M to $2B.
    Small,
    /// $2B to $10B.
    Mid,
    /// $10B to $200B.
    Large,
    /// $200B and above.
    Mega,
}

impl MarketCapBucket {
    /// Classify a market cap.
    #[must_use]
    pub fn from_market_cap(market_cap: f64) -> Self {
        if market_cap < 300e6 {
            Self::Micro
        } else if market_cap < 2e9 {
            Self::Small
        } else if market_cap < 10e9 {
            Self::Mid
        } else if market_cap < 200e9 {
            Self::Large
        } else {
            Self::Mega
        }
    }
}

impl fmt::Display for MarketCapBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Micro => "Micro-cap",
            Self::Small => "Small-cap",
            Self::Mid => "Mid-cap",
            Self::Large => "Large-cap",
            Self::Mega => "Mega-cap",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_metric_present_as_key() {
        let record = CanonicalMetrics::new("AAPL");
        assert_eq!(record.iter().count(), Metric::ALL.len());
        assert_eq!(record.present_count(), 0);
    }

    #[test]
    fn test_from_values_drops_non_finite() {
        let record = CanonicalMetrics::from_values(
            "AAPL",
            [(Metric::PeRatio, 12.0), (Metric::Roe, f64::NAN), (Metric::Revenue, f64::INFINITY)],
        );
        assert_eq!(record.get(Metric::PeRatio), Some(12.0));
        assert_eq!(record.get(Metric::Roe), None);
        assert_eq!(record.get(Metric::Revenue), None);
        assert_eq!(record.iter().count(), Metric::ALL.len());
    }

    #[test]
    fn test_zero_is_a_value() {
        let record = CanonicalMetrics::from_values("X", [(Metric::DebtToEquity, 0.0)]);
        assert!(record.is_present(Metric::DebtToEquity));
    }

    #[test]
    fn test_raw_record_fields() {
        let raw = RawRecord::new("AAPL", json!({"marketCap": 1.0}));
        assert!(raw.fields().is_some());

        let raw = RawRecord::new("AAPL", serde_json::Value::Null);
        assert!(raw.fields().is_none());
    }

    #[test]
    fn test_market_cap_bucket() {
        assert_eq!(MarketCapBucket::from_market_cap(100e6), MarketCapBucket::Micro);
        assert_eq!(MarketCapBucket::from_market_cap(1.5e9), MarketCapBucket::Small);
        assert_eq!(MarketCapBucket::from_market_cap(5e9), MarketCapBucket::Mid);
        assert_eq!(MarketCapBucket::from_market_cap(50e9), MarketCapBucket::Large);
        assert_eq!(MarketCapBucket::from_market_cap(3e12), MarketCapBucket::Mega);
        assert_eq!(MarketCapBucket::Small.to_string(), "Small-cap");
    }

    #[test]
    fn test_staleness() {
        let as_of = Date::from_ymd_opt(2024, 1, 1).unwrap();
        let today = Date::from_ymd_opt(2024, 12, 31).unwrap();
        let record = CanonicalMetrics::new("X").with_as_of(as_of);
        assert!(record.is_stale(today, 180));
        assert!(!record.is_stale(today, 400));
        assert!(!CanonicalMetrics::new("Y").is_stale(today, 0));
    }

    #[test]
    fn test_serializes_metric_keys() {
        let record = CanonicalMetrics::from_values("AAPL", [(Metric::Roe, 0.2)]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["values"]["roe"], json!(0.2));
        assert_eq!(value["values"]["pe_ratio"], serde_json::Value::Null);
    }
}
