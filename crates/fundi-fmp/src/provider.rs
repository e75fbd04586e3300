//! [`DataProvider`] implementation backed by FMP.

use crate::FmpClient;
use async_trait::async_trait;
use fundi_traits::{DataProvider, RawRecord, Result, Symbol};

#[async_trait]
impl DataProvider for FmpClient {
    fn name(&self) -> &str {
        "fmp"
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<RawRecord> {
        let data = self.fundamental_data(ticker).await?;
        Ok(RawRecord::new(data.symbol.clone(), data.to_payload()))
    }

    async fn list_sector_tickers(&self, sector: &str) -> Result<Vec<Symbol>> {
        let entries = self.company_screener(sector).await?;
        tracing::debug!(sector, count = entries.len(), "FMP sector listing");
        Ok(entries.into_iter().map(|e| e.symbol).collect())
    }
}
