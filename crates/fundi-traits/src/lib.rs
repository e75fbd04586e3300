#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the fundi screening engine.
//!
//! This crate provides the foundational abstractions shared by the normalizer,
//! the criteria evaluator, the sector screener and the comparison aggregator.

/// The version of the fundi-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod metric;
pub mod provider;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{FundiError, Result};
pub use metric::{Direction, Metric};
pub use provider::{DataProvider, Fixture, InjectedFailure, StaticProvider};
pub use types::{CanonicalMetrics, Date, MarketCapBucket, RawRecord, Symbol};
