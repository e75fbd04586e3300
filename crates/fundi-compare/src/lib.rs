//! Peer comparison for fundi.
//!
//! This crate ranks companies against each other:
//! - [`ComparisonAggregator`] builds a [`ComparisonTable`] of rank, percentile
//!   and z-score per ticker and metric, honouring each metric's direction
//! - [`SectorSummary`] aggregates a sector and flags companies priced below
//!   the sector median P/E while earning above the median ROE
//!
//! Absent values are never ranked: a ticker missing a metric simply has no
//! entry for it, and a metric nobody reports has no column.
//!
//! # Example
//!
//! ```rust,ignore
//! use fundi_compare::ComparisonAggregator;
//! use fundi_traits::Metric;
//!
//! let table = ComparisonAggregator::new().compare(&records);
//! for (ticker, cmp) in table.leaders(Metric::Roe, 3) {
//!     println!("{ticker}: #{} ({:.0}th pct)", cmp.rank, cmp.percentile * 100.0);
//! }
//! ```

pub mod aggregator;
pub mod rank;
pub mod summary;

// Re-export main types
pub use aggregator::{ComparisonAggregator, ComparisonTable, MetricComparison};
pub use rank::{RankedValue, competition_ranks};
pub use summary::{MetricSummary, SectorSummary};
