//! Rule evaluation against canonical metrics.

use crate::rule::CriteriaRule;
use crate::set::CriteriaSet;
use fundi_traits::CanonicalMetrics;
use serde::{Deserialize, Serialize};

/// Result of checking one rule against one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVerdict {
    /// Metric present and the comparison held
    Pass,
    /// Metric present and the comparison did not hold
    Fail,
    /// Metric absent; counts as a failure
    Missing,
    /// Metric absent and the rule skips on missing data
    Skipped,
}

impl RuleVerdict {
    /// Whether the verdict counts against the rule.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Fail | Self::Missing)
    }
}

/// Outcome of evaluating a full rule set against one ticker.
///
/// Rule names appear in declaration order. Failed optional rules are listed
/// in `failed_rules` but do not clear `passed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    /// No required rule failed
    pub passed: bool,
    /// Rules whose comparison held
    pub passed_rules: Vec<String>,
    /// Rules that failed, including those failed for missing data
    pub failed_rules: Vec<String>,
    /// Rules skipped because their metric was absent
    pub skipped_rules: Vec<String>,
}

/// Evaluates criteria sets. Evaluation is total: every rule gets a verdict,
/// absent data never raises.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaEvaluator;

impl CriteriaEvaluator {
    /// Create a new evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Verdict for a single rule.
    #[must_use]
    pub fn verdict(&self, metrics: &CanonicalMetrics, rule: &CriteriaRule) -> RuleVerdict {
        match metrics.get(rule.metric()) {
            Some(value) if rule.check(value) => RuleVerdict::Pass,
            Some(_) => RuleVerdict::Fail,
            None if rule.skips_if_missing() => RuleVerdict::Skipped,
            None => RuleVerdict::Missing,
        }
    }

    /// Evaluate every rule in declaration order.
    #[must_use]
    pub fn evaluate(&self, metrics: &CanonicalMetrics, rules: &CriteriaSet) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome {
            passed: true,
            ..EvaluationOutcome::default()
        };

        for rule in rules {
            let verdict = self.verdict(metrics, rule);
            let name = rule.name().to_string();
            match verdict {
                RuleVerdict::Pass => outcome.passed_rules.push(name),
                RuleVerdict::Skipped => outcome.skipped_rules.push(name),
                RuleVerdict::Fail | RuleVerdict::Missing => {
                    if !rule.is_optional() {
                        outcome.passed = false;
                    }
                    outcome.failed_rules.push(name);
                }
            }
        }

        tracing::trace!(
            ticker = metrics.ticker(),
            passed = outcome.passed,
            failed = outcome.failed_rules.len(),
            skipped = outcome.skipped_rules.len(),
            "evaluated criteria"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Comparator;
    use fundi_traits::Metric;

    fn metrics(pe: Option<f64>, roe: Option<f64>) -> CanonicalMetrics {
        let values = [(Metric::PeRatio, pe), (Metric::Roe, roe)]
            .into_iter()
            .filter_map(|(m, v)| v.map(|v| (m, v)));
        CanonicalMetrics::from_values("TEST", values)
    }

    fn value_set() -> CriteriaSet {
        CriteriaSet::from_thresholds([("max_pe_ratio", 15.0), ("min_roe", 0.10)]).unwrap()
    }

    #[test]
    fn test_all_rules_pass() {
        let outcome = CriteriaEvaluator::new().evaluate(&metrics(Some(12.0), Some(0.18)), &value_set());
        assert!(outcome.passed);
        assert_eq!(outcome.passed_rules, vec!["max_pe_ratio", "min_roe"]);
        assert!(outcome.failed_rules.is_empty());
    }

    #[test]
    fn test_failed_rule_listed() {
        let outcome = CriteriaEvaluator::new().evaluate(&metrics(Some(22.0), Some(0.15)), &value_set());
        assert!(!outcome.passed);
        assert_eq!(outcome.failed_rules, vec!["max_pe_ratio"]);
        assert_eq!(outcome.passed_rules, vec!["min_roe"]);
    }

    #[test]
    fn test_missing_metric_fails() {
        let outcome = CriteriaEvaluator::new().evaluate(&metrics(Some(12.0), None), &value_set());
        assert!(!outcome.passed);
        assert_eq!(outcome.failed_rules, vec!["min_roe"]);
    }

    #[test]
    fn test_missing_metric_skipped() {
        let set = CriteriaSet::parse_all(["pe_ratio <= 15", "roe >= 0.1 ~"]).unwrap();
        let outcome = CriteriaEvaluator::new().evaluate(&metrics(Some(12.0), None), &set);
        assert!(outcome.passed);
        assert_eq!(outcome.skipped_rules, vec!["min_roe"]);
        assert!(outcome.failed_rules.is_empty());
    }

    #[test]
    fn test_optional_failure_does_not_reject() {
        let set = CriteriaSet::parse_all(["pe_ratio <= 15", "roe >= 0.2 ?"]).unwrap();
        let outcome = CriteriaEvaluator::new().evaluate(&metrics(Some(12.0), Some(0.1)), &set);
        assert!(outcome.passed);
        assert_eq!(outcome.failed_rules, vec!["min_roe"]);
    }

    #[test]
    fn test_empty_set_passes() {
        let outcome =
            CriteriaEvaluator::new().evaluate(&metrics(None, None), &CriteriaSet::default());
        assert!(outcome.passed);
        assert!(outcome.passed_rules.is_empty());
    }

    #[test]
    fn test_verdicts() {
        let eval = CriteriaEvaluator::new();
        let rule = CriteriaRule::for_metric(Metric::PeRatio, Comparator::Le, 15.0).unwrap();
        assert_eq!(eval.verdict(&metrics(Some(15.0), None), &rule), RuleVerdict::Pass);
        assert_eq!(eval.verdict(&metrics(Some(15.1), None), &rule), RuleVerdict::Fail);
        assert_eq!(eval.verdict(&metrics(None, None), &rule), RuleVerdict::Missing);
        assert!(RuleVerdict::Missing.is_failure());
        let rule = rule.skip_if_missing();
        assert_eq!(eval.verdict(&metrics(None, None), &rule), RuleVerdict::Skipped);
        assert!(!RuleVerdict::Skipped.is_failure());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const COMPARATORS: [Comparator; 5] = [
            Comparator::Le,
            Comparator::Ge,
            Comparator::Lt,
            Comparator::Gt,
            Comparator::Eq,
        ];

        fn record() -> impl Strategy<Value = CanonicalMetrics> {
            prop::collection::vec(prop::option::of(-1.0e6..1.0e6f64), Metric::ALL.len()).prop_map(
                |values| {
                    let present = Metric::ALL
                        .into_iter()
                        .zip(values)
                        .filter_map(|(m, v)| v.map(|v| (m, v)));
                    CanonicalMetrics::from_values("TEST", present)
                },
            )
        }

        fn rule_set() -> impl Strategy<Value = CriteriaSet> {
            let rule = (
                0..Metric::ALL.len(),
                0..COMPARATORS.len(),
                -1.0e6..1.0e6f64,
                any::<bool>(),
                any::<bool>(),
            );
            prop::collection::vec(rule, 0..12).prop_map(|specs| {
                let rules = specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (metric, cmp, threshold, optional, skip))| {
                        let mut rule = CriteriaRule::with_name(
                            format!("rule_{i}"),
                            Metric::ALL[metric],
                            COMPARATORS[cmp],
                            threshold,
                        )
                        .unwrap();
                        if optional {
                            rule = rule.optional();
                        }
                        if skip {
                            rule = rule.skip_if_missing();
                        }
                        rule
                    })
                    .collect();
                CriteriaSet::new(rules).unwrap()
            })
        }

        proptest! {
            #[test]
            fn evaluation_is_deterministic(metrics in record(), rules in rule_set()) {
                let eval = CriteriaEvaluator::new();
                let first = eval.evaluate(&metrics, &rules);
                let second = eval.evaluate(&metrics, &rules);
                prop_assert_eq!(&first, &second);

                let verdicts =
                    first.passed_rules.len() + first.failed_rules.len() + first.skipped_rules.len();
                prop_assert_eq!(verdicts, rules.len());
            }
        }
    }
}
