//! Party-control classification and cohort partitioning.
//!
//! Responsibilities:
//!
//! - label each year Republican / Democrat / split control (`classifier`)
//! - group labeled years into ordered cohorts within a year window (`partition`)

pub mod classifier;
pub mod partition;

pub use classifier::*;
pub use partition::*;
