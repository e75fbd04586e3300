//! The market-data provider boundary.
//!
//! A provider is an explicit value constructed once and handed to the
//! screener, never ambient process state. Session caches and rate-limit
//! counters belong inside the implementation.

use crate::{FundiError, RawRecord, Result, Symbol};
use async_trait::async_trait;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

/// Source of raw fundamentals.
///
/// Implementations report per-ticker failures with [`FundiError::NotFound`],
/// [`FundiError::RateLimited`] or [`FundiError::Network`]; callers isolate them
/// per ticker.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Fetch the raw fundamentals record for a ticker.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticker is unknown, the provider is rate limiting,
    /// or the request failed in transit.
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<RawRecord>;

    /// List the ticker universe of a sector.
    ///
    /// # Errors
    ///
    /// Returns an error if the sector listing cannot be retrieved.
    async fn list_sector_tickers(&self, sector: &str) -> Result<Vec<Symbol>>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<RawRecord> {
        (**self).fetch_fundamentals(ticker).await
    }

    async fn list_sector_tickers(&self, sector: &str) -> Result<Vec<Symbol>> {
        (**self).list_sector_tickers(sector).await
    }
}

/// Failure a [`StaticProvider`] injects for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectedFailure {
    /// Always report the ticker as not found.
    NotFound,
    /// Always report a rate limit.
    RateLimited,
    /// Always fail with a network error.
    Network,
    /// Fail with a network error on the first call only.
    NetworkOnce,
}

/// On-disk shape of a provider fixture.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    /// Sector name to ticker universe.
    #[serde(default)]
    pub sectors: BTreeMap<String, Vec<Symbol>>,
    /// Ticker to raw payload.
    #[serde(default)]
    pub records: BTreeMap<Symbol, serde_json::Value>,
    /// Ticker to injected failure.
    #[serde(default)]
    pub failures: BTreeMap<Symbol, InjectedFailure>,
}

/// In-memory provider backed by fixed payloads.
///
/// Used for offline runs from a fixture file and for tests. Record lookup is
/// case-insensitive and answers with the stored symbol; tickers missing from
/// `records` are reported as not found.
#[derive(Debug, Default)]
pub struct StaticProvider {
    fixture: Fixture,
    delays: BTreeMap<Symbol, Duration>,
    listing_delay: Option<Duration>,
    calls: Mutex<BTreeMap<Symbol, usize>>,
}

impl StaticProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider from a parsed fixture.
    #[must_use]
    pub fn from_fixture(fixture: Fixture) -> Self {
        Self {
            fixture,
            ..Self::default()
        }
    }

    /// Parse a fixture from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FundiError::Config`] if the text is not a valid fixture.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(text)
            .map_err(|e| FundiError::Config(format!("invalid provider fixture: {e}")))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Add a sector universe.
    #[must_use]
    pub fn with_sector<I, S>(mut self, sector: impl Into<String>, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.fixture
            .sectors
            .insert(sector.into(), tickers.into_iter().map(Into::into).collect());
        self
    }

    /// Add a raw payload for a ticker.
    #[must_use]
    pub fn with_record(mut self, ticker: impl Into<Symbol>, payload: serde_json::Value) -> Self {
        self.fixture.records.insert(ticker.into(), payload);
        self
    }

    /// Make a ticker fail.
    #[must_use]
    pub fn with_failure(mut self, ticker: impl Into<Symbol>, failure: InjectedFailure) -> Self {
        self.fixture.failures.insert(ticker.into(), failure);
        self
    }

    /// Delay responses for a ticker.
    #[must_use]
    pub fn with_delay(mut self, ticker: impl Into<Symbol>, delay: Duration) -> Self {
        self.delays.insert(ticker.into(), delay);
        self
    }

    /// Delay every sector listing.
    #[must_use]
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    /// Number of fetches issued for a ticker so far.
    #[must_use]
    pub fn call_count(&self, ticker: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ticker)
            .copied()
            .unwrap_or(0)
    }

    fn record_call(&self, ticker: &str) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let count = calls.entry(ticker.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

#[async_trait]
impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<RawRecord> {
        let call = self.record_call(ticker);

        if let Some(delay) = self.delays.get(ticker) {
            tokio::time::sleep(*delay).await;
        }

        match self.fixture.failures.get(ticker) {
            Some(InjectedFailure::NotFound) => {
                return Err(FundiError::NotFound(ticker.to_string()));
            }
            Some(InjectedFailure::RateLimited) => {
                return Err(FundiError::RateLimited(format!("throttled on {ticker}")));
            }
            Some(InjectedFailure::Network) => {
                return Err(FundiError::Network(format!("connection reset for {ticker}")));
            }
            Some(InjectedFailure::NetworkOnce) if call == 1 => {
                return Err(FundiError::Network(format!("connection reset for {ticker}")));
            }
            _ => {}
        }

        let records = &self.fixture.records;
        records
            .get_key_value(ticker)
            .or_else(|| records.iter().find(|(symbol, _)| symbol.eq_ignore_ascii_case(ticker)))
            .map(|(symbol, payload)| RawRecord::new(symbol.as_str(), payload.clone()))
            .ok_or_else(|| FundiError::NotFound(ticker.to_string()))
    }

    async fn list_sector_tickers(&self, sector: &str) -> Result<Vec<Symbol>> {
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }
        self.fixture
            .sectors
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(sector))
            .map(|(_, tickers)| tickers.clone())
            .ok_or_else(|| FundiError::NotFound(format!("sector '{sector}'")))
    }
}
