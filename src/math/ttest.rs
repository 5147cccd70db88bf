//! One-sided comparison of two cohort means.
//!
//! The statistic scales the difference in means by the first cohort's own
//! standard deviation rather than a pooled or Welch variance:
//!
//! ```text
//! t  = (mean_a - mean_b) / std_a
//! df = min(n_a, n_b) - 1
//! p  = 1 - F_t(|t|; df)
//! ```
//!
//! `df` follows the smaller cohort, so it is `n_a - 1` whenever `a` is the
//! smaller one.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::math::descriptive::CohortSummary;

/// Result of a one-sided test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneSidedTest {
    pub t_stat: f64,
    pub df: usize,
    pub p_value: f64,
}

/// Compare cohort `a` against cohort `b`.
///
/// Returns `None` when the test is undefined: fewer than two observations in
/// either cohort, a non-finite mean, or a non-positive / non-finite `std_a`.
pub fn one_sided_test(a: &CohortSummary, b: &CohortSummary) -> Option<OneSidedTest> {
    if a.count < 2 || b.count < 2 {
        return None;
    }
    if !(a.mean.is_finite() && b.mean.is_finite()) {
        return None;
    }
    if !(a.std.is_finite() && a.std > 0.0) {
        return None;
    }

    let t_stat = (a.mean - b.mean) / a.std;
    let df = a.count.min(b.count) - 1;
    let p_value = upper_tail(t_stat.abs(), df)?;

    Some(OneSidedTest { t_stat, df, p_value })
}

/// `1 - F_t(x; df)` for the standard Student's t distribution.
pub fn upper_tail(x: f64, df: usize) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, df as f64).ok()?;
    Some(1.0 - dist.cdf(x))
}
