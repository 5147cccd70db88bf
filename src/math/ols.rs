//! Least squares solver and simple linear regression.
//!
//! The scatter views relate a fiscal variable to a chamber's Democrat seat
//! share. The numeric counterpart is an ordinary least squares line:
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! Implementation choices:
//! - We build the `[1, x]` design matrix and solve with SVD, which stays
//!   well-behaved for tall systems and reports rank deficiency instead of
//!   panicking.
//! - A regressor with no variance is rejected up front.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Relative spread of `x` below which the regression is considered degenerate.
const MIN_X_SPREAD: f64 = 1e-12;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// A fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    /// Coefficient of determination (`NaN` when `y` has no variance).
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y = a + b x` over paired observations.
///
/// Pairs with a non-finite coordinate are dropped. Returns `None` with fewer
/// than two usable pairs or when `x` is (numerically) constant.
pub fn simple_regression(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let x_min = pairs.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = pairs.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if (x_max - x_min) <= MIN_X_SPREAD * x_max.abs().max(1.0) {
        return None;
    }

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { pairs[i].0 });
    let y = DVector::from_iterator(n, pairs.iter().map(|p| p.1));
    let beta = solve_least_squares(&design, &y)?;

    let fit = LinearFit {
        intercept: beta[0],
        slope: beta[1],
        r_squared: f64::NAN,
        n,
    };

    let y_mean = y.mean();
    let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let ss_res: f64 = pairs.iter().map(|&(x, y)| (y - fit.predict(x)).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { f64::NAN };

    Some(LinearFit { r_squared, ..fit })
}
