//! Screening rules for fundi.
//!
//! A [`CriteriaRule`] compares one canonical metric against a threshold. Rules
//! are grouped into a [`CriteriaSet`] and checked by the [`CriteriaEvaluator`],
//! which never errors: an absent metric fails the rule unless the rule skips on
//! missing data.
//!
//! Rules can be built in code, parsed from expressions, or loaded from JSON/TOML:
//!
//! ```ignore
//! use fundi_criteria::{CriteriaEvaluator, CriteriaSet};
//!
//! let rules = CriteriaSet::parse_all(["pe_ratio <= 15", "roe >= 10%", "dividend_yield > 0 ?~"])?;
//! let outcome = CriteriaEvaluator::new().evaluate(&metrics, &rules);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod evaluator;
pub mod rule;
pub mod set;

pub use evaluator::{CriteriaEvaluator, EvaluationOutcome, RuleVerdict};
pub use rule::{Comparator, CriteriaRule, RuleSpec, default_name};
pub use set::CriteriaSet;
