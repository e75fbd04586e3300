//! Direction-aware ranking of peer values.

use fundi_traits::Direction;

/// Rank and percentile of one value among its peers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedValue {
    /// 1 = best; ties share the best rank and the next rank skips
    pub rank: usize,
    /// Share of peers strictly worse than this value
    pub percentile: f64,
}

/// Rank `values` with competition ranking (1, 1, 3).
///
/// Percentile is the count of strictly worse peers over the number of
/// values; a lone value gets 1.0.
///
/// # Examples
///
/// ```
/// use fundi_compare::rank::competition_ranks;
/// use fundi_traits::Direction;
///
/// let ranked = competition_ranks(&[10.0, 10.0, 20.0], Direction::LowerIsBetter);
/// let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
/// assert_eq!(ranks, vec![1, 1, 3]);
/// ```
#[must_use]
pub fn competition_ranks(values: &[f64], direction: Direction) -> Vec<RankedValue> {
    let n = values.len();
    if n == 1 {
        return vec![RankedValue {
            rank: 1,
            percentile: 1.0,
        }];
    }

    let mut ascending: Vec<f64> = values.iter().map(|v| direction.orient(*v)).collect();
    ascending.sort_by(f64::total_cmp);

    values
        .iter()
        .map(|v| {
            let oriented = direction.orient(*v);
            let worse = ascending.partition_point(|x| *x < oriented);
            let better = n - ascending.partition_point(|x| *x <= oriented);
            RankedValue {
                rank: better + 1,
                percentile: worse as f64 / n as f64,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_higher_is_better() {
        let ranked = competition_ranks(&[0.10, 0.30, 0.20], Direction::HigherIsBetter);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![3, 1, 2]);
        assert_relative_eq!(ranked[1].percentile, 2.0 / 3.0);
        assert_relative_eq!(ranked[0].percentile, 0.0);
    }

    #[test]
    fn test_ties_share_best_rank() {
        let ranked = competition_ranks(&[10.0, 10.0, 20.0], Direction::LowerIsBetter);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert_relative_eq!(ranked[0].percentile, 1.0 / 3.0);
        assert_relative_eq!(ranked[2].percentile, 0.0);
    }

    #[test]
    fn test_single_value() {
        let ranked = competition_ranks(&[42.0], Direction::HigherIsBetter);
        assert_eq!(ranked, vec![RankedValue { rank: 1, percentile: 1.0 }]);
    }

    #[test]
    fn test_empty() {
        assert!(competition_ranks(&[], Direction::HigherIsBetter).is_empty());
    }
}
