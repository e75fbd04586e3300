//! FMP API client implementation.

use crate::{
    Result,
    error::FmpError,
    types::{
        BalanceSheet, CompanyProfile, FinancialRatios, FundamentalData, IncomeStatement,
        KeyMetrics, Period, Quote, ScreenerEntry,
    },
};
use reqwest::Client;
use std::env;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Default number of companies requested from the sector screener.
pub const DEFAULT_SCREENER_LIMIT: u32 = 100;

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    screener_limit: u32,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            screener_limit: DEFAULT_SCREENER_LIMIT,
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Set the maximum number of tickers listed per sector.
    #[must_use]
    pub const fn with_screener_limit(mut self, limit: u32) -> Self {
        self.screener_limit = limit;
        self
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        tracing::trace!(endpoint, "FMP request");
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        // Check for error responses
        if text.contains("\"Error Message\"") || text.contains("\"error\"") {
            if text.contains("Limit Reach") {
                return Err(FmpError::RateLimitExceeded);
            }
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn statement_endpoint(path: &str, symbol: &str, period: Period, limit: Option<u32>) -> String {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        format!(
            "{path}?symbol={}&period={}{}",
            symbol.to_uppercase(),
            period.as_str(),
            limit_param
        )
    }

    /// Get income statements for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<IncomeStatement>> {
        self.get(&Self::statement_endpoint("income-statement", symbol, period, limit))
            .await
    }

    /// Get balance sheets for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<BalanceSheet>> {
        self.get(&Self::statement_endpoint(
            "balance-sheet-statement",
            symbol,
            period,
            limit,
        ))
        .await
    }

    /// Get key metrics for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn key_metrics(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<KeyMetrics>> {
        self.get(&Self::statement_endpoint("key-metrics", symbol, period, limit))
            .await
    }

    /// Get financial ratios for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn ratios(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<FinancialRatios>> {
        self.get(&Self::statement_endpoint("ratios", symbol, period, limit))
            .await
    }

    /// Get real-time quote for a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::SymbolNotFound`] if FMP has no quote for the symbol.
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let endpoint = format!("quote?symbol={}", symbol.to_uppercase());
        let quotes: Vec<Quote> = self.get(&endpoint).await?;
        quotes
            .into_iter()
            .next()
            .ok_or_else(|| FmpError::SymbolNotFound(symbol.to_string()))
    }

    /// Get the company profile for a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::NoData`] if FMP returns an empty profile list.
    pub async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let endpoint = format!("profile?symbol={}", symbol.to_uppercase());
        let profiles: Vec<CompanyProfile> = self.get(&endpoint).await?;
        profiles
            .into_iter()
            .next()
            .ok_or_else(|| FmpError::NoData(format!("{symbol} profile")))
    }

    /// List actively traded companies in a sector, largest first.
    ///
    /// ETFs and funds are excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn company_screener(&self, sector: &str) -> Result<Vec<ScreenerEntry>> {
        let endpoint = format!(
            "company-screener?sector={}&isEtf=false&isFund=false&isActivelyTrading=true&limit={}",
            sector.replace(' ', "%20"),
            self.screener_limit
        );
        let mut entries: Vec<ScreenerEntry> = self.get(&endpoint).await?;
        entries.retain(|e| !e.is_etf && !e.is_fund);
        entries.sort_by(|a, b| {
            b.market_cap
                .unwrap_or(0.0)
                .total_cmp(&a.market_cap.unwrap_or(0.0))
        });
        Ok(entries)
    }

    /// Get the fundamental snapshot for a symbol.
    ///
    /// The quote is required; every other endpoint is best effort, except
    /// that a rate limit on any of them aborts the fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the quote request fails or any request is rate limited.
    pub async fn fundamental_data(&self, symbol: &str) -> Result<FundamentalData> {
        let (quote, profile, income, balance, metrics, ratios) = tokio::join!(
            self.quote(symbol),
            self.profile(symbol),
            self.income_statement(symbol, Period::Annual, Some(2)),
            self.balance_sheet(symbol, Period::Annual, Some(1)),
            self.key_metrics(symbol, Period::Annual, Some(1)),
            self.ratios(symbol, Period::Annual, Some(1)),
        );
        let quote = quote?;

        Ok(FundamentalData {
            symbol: symbol.to_uppercase(),
            quote,
            profile: best_effort(symbol, "profile", profile)?,
            income_statements: best_effort(symbol, "income-statement", income)?
                .unwrap_or_default(),
            balance_sheets: best_effort(symbol, "balance-sheet-statement", balance)?
                .unwrap_or_default(),
            key_metrics: best_effort(symbol, "key-metrics", metrics)?.unwrap_or_default(),
            ratios: best_effort(symbol, "ratios", ratios)?.unwrap_or_default(),
        })
    }
}

fn best_effort<T>(symbol: &str, endpoint: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(FmpError::RateLimitExceeded) => Err(FmpError::RateLimitExceeded),
        Err(e) => {
            tracing::debug!(symbol, endpoint, error = %e, "optional FMP endpoint failed");
            Ok(None)
        }
    }
}
