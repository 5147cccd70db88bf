//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the yearly record (`FiscalYearRecord`) and its parts (`ChamberSeats`, `FiscalValues`)
//! - classification knobs (`ControlDefinition`, `MajorityRule`, `IntegrityMode`, `OnFault`)
//! - derived labels (`ControlLabel`) and run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
