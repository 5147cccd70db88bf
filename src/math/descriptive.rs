//! Cohort aggregation: mean, sample standard deviation, and count.
//!
//! Conventions follow the usual statistics-library defaults:
//! - missing values are excluded and `count` is the number of non-missing values
//! - the standard deviation uses the `n - 1` denominator
//! - an empty input gives `count = 0` with `mean = NaN` and `std = NaN`
//! - a single value gives a finite mean and `std = NaN`

use serde::{Deserialize, Serialize};

use crate::domain::{FiscalField, FiscalYearRecord};

/// `(mean, sample std, count)` for one cohort and one variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

impl CohortSummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summarize a sequence of possibly-missing values.
///
/// Non-finite values are treated as missing.
pub fn summarize<I>(values: I) -> CohortSummary
where
    I: IntoIterator<Item = Option<f64>>,
{
    let xs: Vec<f64> = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
    let count = xs.len();
    if count == 0 {
        return CohortSummary {
            mean: f64::NAN,
            std: f64::NAN,
            count,
        };
    }

    let n = count as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = xs.iter().map(|x| (x - mean) * (x - mean)).sum();
        (ss / (n - 1.0)).sqrt()
    };

    CohortSummary { mean, std, count }
}

/// Summarize `field` across the records of a cohort.
pub fn summarize_cohort(records: &[&FiscalYearRecord], field: FiscalField) -> CohortSummary {
    summarize(records.iter().map(|r| r.value(field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_sample_std() {
        let s = summarize([Some(2.0), Some(4.0), Some(4.0), Some(4.0), Some(5.0), Some(5.0), Some(7.0), Some(9.0)]);
        assert_eq!(s.count, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        // Population std is 2.0; sample std is sqrt(32/7).
        assert!((s.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn missing_values_are_not_counted() {
        let s = summarize([Some(-1.0), None, Some(-3.0), Some(f64::NAN)]);
        assert_eq!(s.count, 2);
        assert!((s.mean + 2.0).abs() < 1e-12);
        assert!((s.std - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_cohort_is_nan_with_zero_count() {
        let s = summarize(std::iter::empty());
        assert!(s.is_empty());
        assert!(s.mean.is_nan());
        assert!(s.std.is_nan());

        let cohort: Vec<&FiscalYearRecord> = Vec::new();
        let s = summarize_cohort(&cohort, FiscalField::Deficit);
        assert_eq!(s.count, 0);
    }

    #[test]
    fn single_value_has_undefined_std() {
        let s = summarize([Some(3.5)]);
        assert_eq!(s.count, 1);
        assert!((s.mean - 3.5).abs() < 1e-12);
        assert!(s.std.is_nan());
    }
}
