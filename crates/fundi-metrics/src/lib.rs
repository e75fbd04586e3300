//! Fundamentals normalization for fundi.
//!
//! This crate turns provider payloads into [`CanonicalMetrics`](fundi_traits::CanonicalMetrics):
//! - A fixed lookup table maps provider field names onto canonical metrics
//! - Strings are coerced to numbers (`"12%"` is 0.12); anything unparsable is absent
//! - Revenue growth and, optionally, margin/return/leverage ratios are derived
//!   from statement lines when not reported directly
//!
//! The [`registry`] describes every canonical metric for discovery.
//!
//! # Example
//!
//! ```ignore
//! use fundi_metrics::FundamentalsNormalizer;
//!
//! let normalizer = FundamentalsNormalizer::default();
//! let metrics = normalizer.normalize(&raw)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod fields;
pub mod normalizer;
pub mod registry;

// Re-export key types
pub use normalizer::{FundamentalsNormalizer, NormalizerConfig, coerce_number, growth_rate};
pub use registry::{MetricCategory, MetricInfo};
