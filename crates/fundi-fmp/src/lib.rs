//! Financial Modeling Prep (FMP) data provider for fundi.
//!
//! This crate fetches fundamentals from the
//! [Financial Modeling Prep](https://financialmodelingprep.com/) API and exposes
//! them through [`DataProvider`](fundi_traits::DataProvider). Each ticker's quote,
//! profile, ratios, key metrics and last two annual income statements are joined
//! into one flat payload that the normalizer understands.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fundi_fmp::FmpClient;
//! use fundi_traits::DataProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmpClient::from_env()?;
//!
//!     let tickers = client.list_sector_tickers("Healthcare").await?;
//!     let record = client.fetch_fundamentals(&tickers[0]).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod provider;
mod types;

pub use client::{DEFAULT_SCREENER_LIMIT, FmpClient};
pub use error::FmpError;
pub use types::*;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
