//! `fiscal-control` library crate.
//!
//! Classifies each year by which party held the White House and Congress,
//! splits years into Republican, Democrat, and split-control cohorts, and
//! summarizes deficits, receipts, and spending per cohort.
//!
//! The binary (`fiscal`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the classifier and statistics are reusable outside the CLI

pub mod app;
pub mod cli;
pub mod control;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod report;
