//! Data types for FMP API responses.
//!
//! Numeric fields are optional: FMP returns `null` or omits fields it has no
//! data for, and a missing value must stay missing rather than become zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Annual reports (10-K filings).
    #[default]
    Annual,
    /// Quarterly reports (10-Q filings).
    Quarter,
}

impl Period {
    /// Get the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()
}

/// Income statement data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Filing date.
    #[serde(default)]
    pub date: String,
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Gross profit.
    pub gross_profit: Option<f64>,
    /// Operating income.
    pub operating_income: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
}

impl IncomeStatement {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Balance sheet data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Filing date.
    #[serde(default)]
    pub date: String,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total debt.
    pub total_debt: Option<f64>,
    /// Total stockholders' equity.
    pub total_stockholders_equity: Option<f64>,
}

/// Key financial metrics from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    /// Filing date.
    #[serde(default)]
    pub date: String,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Return on equity.
    #[serde(alias = "returnOnEquity")]
    pub roe: Option<f64>,
    /// Return on assets.
    pub return_on_assets: Option<f64>,
    /// Current ratio.
    pub current_ratio: Option<f64>,
}

/// Financial ratios from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRatios {
    /// Filing date.
    #[serde(default)]
    pub date: String,
    /// Gross profit margin.
    pub gross_profit_margin: Option<f64>,
    /// Operating profit margin.
    pub operating_profit_margin: Option<f64>,
    /// Net profit margin.
    pub net_profit_margin: Option<f64>,
    /// Return on assets.
    pub return_on_assets: Option<f64>,
    /// Return on equity.
    pub return_on_equity: Option<f64>,
    /// Current ratio.
    pub current_ratio: Option<f64>,
    /// Quick ratio.
    pub quick_ratio: Option<f64>,
    /// Debt to equity ratio.
    #[serde(alias = "debtToEquityRatio")]
    pub debt_equity_ratio: Option<f64>,
    /// Price to earnings ratio.
    #[serde(alias = "priceToEarningsRatio")]
    pub price_earnings_ratio: Option<f64>,
    /// Price to earnings growth ratio.
    #[serde(alias = "priceToEarningsGrowthRatio")]
    pub price_earnings_to_growth_ratio: Option<f64>,
    /// Price to book ratio.
    pub price_to_book_ratio: Option<f64>,
    /// Price to sales ratio.
    pub price_to_sales_ratio: Option<f64>,
    /// Dividend yield.
    pub dividend_yield: Option<f64>,
}

/// Real-time quote data from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: Option<String>,
    /// Current price.
    pub price: Option<f64>,
    /// Market cap.
    pub market_cap: Option<f64>,
    /// P/E ratio.
    pub pe: Option<f64>,
    /// Last update as a unix timestamp.
    pub timestamp: Option<i64>,
}

/// Company profile from FMP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub company_name: Option<String>,
    /// Sector.
    pub sector: Option<String>,
    /// Industry.
    pub industry: Option<String>,
    /// Market cap.
    #[serde(alias = "mktCap")]
    pub market_cap: Option<f64>,
}

/// One row of the FMP company screener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerEntry {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub company_name: Option<String>,
    /// Sector.
    pub sector: Option<String>,
    /// Market cap.
    pub market_cap: Option<f64>,
    /// Whether the listing is an ETF.
    #[serde(default)]
    pub is_etf: bool,
    /// Whether the listing is a fund.
    #[serde(default)]
    pub is_fund: bool,
}

/// Fundamental snapshot assembled from several FMP endpoints.
#[derive(Debug, Clone, Default)]
pub struct FundamentalData {
    /// Ticker symbol.
    pub symbol: String,
    /// Current quote.
    pub quote: Quote,
    /// Company profile.
    pub profile: Option<CompanyProfile>,
    /// Income statements (most recent first).
    pub income_statements: Vec<IncomeStatement>,
    /// Balance sheets (most recent first).
    pub balance_sheets: Vec<BalanceSheet>,
    /// Key metrics (most recent first).
    pub key_metrics: Vec<KeyMetrics>,
    /// Financial ratios (most recent first).
    pub ratios: Vec<FinancialRatios>,
}

impl FundamentalData {
    /// Get the most recent income statement.
    #[must_use]
    pub fn latest_income(&self) -> Option<&IncomeStatement> {
        self.income_statements.first()
    }

    /// Get the income statement before the most recent one.
    #[must_use]
    pub fn prior_income(&self) -> Option<&IncomeStatement> {
        self.income_statements.get(1)
    }

    /// Get the most recent balance sheet.
    #[must_use]
    pub fn latest_balance(&self) -> Option<&BalanceSheet> {
        self.balance_sheets.first()
    }

    /// Get the most recent key metrics.
    #[must_use]
    pub fn latest_metrics(&self) -> Option<&KeyMetrics> {
        self.key_metrics.first()
    }

    /// Get the most recent ratios.
    #[must_use]
    pub fn latest_ratios(&self) -> Option<&FinancialRatios> {
        self.ratios.first()
    }

    /// Reporting date of the latest statement data.
    #[must_use]
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.latest_income()
            .and_then(IncomeStatement::parsed_date)
            .or_else(|| self.latest_ratios().and_then(|r| parse_date(&r.date)))
            .or_else(|| self.latest_metrics().and_then(|m| parse_date(&m.date)))
    }

    /// Flatten into a JSON object keyed by canonical field names.
    ///
    /// Ratios take precedence over key metrics, which take precedence over the
    /// quote. Absent values are left out.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let ratios = self.latest_ratios();
        let metrics = self.latest_metrics();
        let income = self.latest_income();
        let balance = self.latest_balance();

        let mut map = Map::new();
        map.insert("symbol".into(), Value::from(self.symbol.clone()));
        if let Some(name) = self
            .profile
            .as_ref()
            .and_then(|p| p.company_name.clone())
            .or_else(|| self.quote.name.clone())
        {
            map.insert("name".into(), Value::from(name));
        }
        if let Some(sector) = self.profile.as_ref().and_then(|p| p.sector.clone()) {
            map.insert("sector".into(), Value::from(sector));
        }
        if let Some(as_of) = self.as_of() {
            map.insert("as_of".into(), Value::from(as_of.to_string()));
        }

        let fields = [
            (
                "pe_ratio",
                ratios.and_then(|r| r.price_earnings_ratio).or(self.quote.pe),
            ),
            ("pb_ratio", ratios.and_then(|r| r.price_to_book_ratio)),
            ("ps_ratio", ratios.and_then(|r| r.price_to_sales_ratio)),
            (
                "peg_ratio",
                ratios.and_then(|r| r.price_earnings_to_growth_ratio),
            ),
            (
                "market_cap",
                self.quote
                    .market_cap
                    .or_else(|| metrics.and_then(|m| m.market_cap))
                    .or_else(|| self.profile.as_ref().and_then(|p| p.market_cap)),
            ),
            ("revenue", income.and_then(|i| i.revenue)),
            (
                "prior_revenue",
                self.prior_income().and_then(|i| i.revenue),
            ),
            ("net_income", income.and_then(|i| i.net_income)),
            ("profit_margin", ratios.and_then(|r| r.net_profit_margin)),
            (
                "operating_margin",
                ratios.and_then(|r| r.operating_profit_margin),
            ),
            ("gross_margin", ratios.and_then(|r| r.gross_profit_margin)),
            (
                "roe",
                ratios
                    .and_then(|r| r.return_on_equity)
                    .or_else(|| metrics.and_then(|m| m.roe)),
            ),
            (
                "roa",
                ratios
                    .and_then(|r| r.return_on_assets)
                    .or_else(|| metrics.and_then(|m| m.return_on_assets)),
            ),
            ("debt_to_equity", ratios.and_then(|r| r.debt_equity_ratio)),
            (
                "current_ratio",
                ratios
                    .and_then(|r| r.current_ratio)
                    .or_else(|| metrics.and_then(|m| m.current_ratio)),
            ),
            ("quick_ratio", ratios.and_then(|r| r.quick_ratio)),
            ("dividend_yield", ratios.and_then(|r| r.dividend_yield)),
            (
                "total_equity",
                balance.and_then(|b| b.total_stockholders_equity),
            ),
            ("total_debt", balance.and_then(|b| b.total_debt)),
        ];
        for (key, value) in fields {
            if let Some(v) = value {
                map.insert(key.into(), Value::from(v));
            }
        }
        Value::Object(map)
    }
}
