//! Sector screening for fundi.
//!
//! The [`SectorScreener`] lists a sector's universe from an injected
//! [`DataProvider`](fundi_traits::DataProvider), fans fetches out over a bounded
//! pool, then normalizes, evaluates and scores every ticker. The result is a
//! [`ScreeningReport`] with three buckets: passing candidates, failing tickers
//! that were still scored, and unresolved tickers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fundi_screen::{ScreenerConfig, SectorScreener};
//! use fundi_traits::StaticProvider;
//!
//! # async fn run(provider: StaticProvider) -> fundi_traits::Result<()> {
//! let screener = SectorScreener::with_config(provider, ScreenerConfig::default());
//! let report = screener
//!     .screen_by_criteria("Healthcare", [("max_pe_ratio", 15.0), ("min_roe", 0.10)])
//!     .await?;
//!
//! for result in report.ranked() {
//!     println!("{} {:.3}", result.ticker, result.score);
//! }
//! # Ok(())
//! # }
//! ```

mod report;
mod score;
mod screener;

// Re-export main types
pub use report::{ScreeningReport, ScreeningResult, UnresolvedReason, UnresolvedTicker};
pub use score::{CompositeScorer, ScoreWeights};
pub use screener::{ScreenerConfig, SectorScreener, normalize_sector_name};
