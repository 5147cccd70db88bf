//! Statistics: cohort summaries, the one-sided cohort test, and least squares.

pub mod descriptive;
pub mod ols;
pub mod ttest;

pub use descriptive::*;
pub use ols::*;
pub use ttest::*;
