//! Cross-sectional statistics over peer values.
//!
//! Inputs here are already filtered to present values; absent metrics never
//! reach these functions.

use ndarray::ArrayView1;

/// Spread below which a cross-section counts as constant.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Location and spread of a peer cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispersion {
    /// Mean of the values
    pub mean: f64,
    /// Sample standard deviation (N-1); zero for a single value
    pub std: f64,
}

impl Dispersion {
    /// Measure `values`, `None` when there are none.
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        let view = ArrayView1::from(values);
        let mean = view.mean()?;
        let std = if values.len() > 1 { view.std(1.0) } else { 0.0 };
        Some(Self { mean, std })
    }

    /// True when peers carry no usable spread.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        !(self.std.is_finite() && self.std > MIN_STD_THRESHOLD)
    }

    /// Distance of `value` from the mean in standard deviations; 0 when degenerate.
    #[must_use]
    pub const fn zscore(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

/// Z-score every value against its own cross-section.
///
/// A single value or a constant cross-section standardizes to all zeros.
///
/// # Examples
///
/// ```
/// use fundi_traits::stats::standardize;
///
/// let z = standardize(&[1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert!(z[2].abs() < 1e-10);
/// assert!(z[0] < 0.0 && z[4] > 0.0);
/// ```
#[must_use]
pub fn standardize(values: &[f64]) -> Vec<f64> {
    Dispersion::of(values).map_or_else(Vec::new, |d| values.iter().map(|&v| d.zscore(v)).collect())
}

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    ArrayView1::from(values).mean()
}

/// Median, `None` for an empty slice. Even-length input averages the middle pair.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standardize_unit_spread() {
        let z = standardize(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mean: f64 = z.iter().sum::<f64>() / z.len() as f64;
        assert!(mean.abs() < 1e-10);

        let variance: f64 = z.iter().map(|x| x.powi(2)).sum::<f64>() / (z.len() - 1) as f64;
        assert_relative_eq!(variance.sqrt(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_dispersion() {
        assert_eq!(Dispersion::of(&[]), None);

        let d = Dispersion::of(&[2.0, 4.0, 6.0]).unwrap();
        assert_relative_eq!(d.mean, 4.0);
        assert_relative_eq!(d.std, 2.0);
        assert_relative_eq!(d.zscore(8.0), 2.0);
    }

    #[test]
    fn test_degenerate_cross_sections() {
        assert!(standardize(&[]).is_empty());
        assert_eq!(standardize(&[42.0]), vec![0.0]);
        assert!(standardize(&[5.0, 5.0, 5.0]).iter().all(|&x| x == 0.0));

        let d = Dispersion::of(&[1.0, 1.0 + 1e-12, 1.0 - 1e-12]).unwrap();
        assert!(d.is_degenerate());
        assert_eq!(d.zscore(3.0), 0.0);
    }

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[]), None);
        assert_relative_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);

        assert_eq!(median(&[]), None);
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_relative_eq!(median(&[4.0, 1.0, 2.0, 3.0]).unwrap(), 2.5);
    }
}
