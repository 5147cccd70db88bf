//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - load-time value overrides (`adjust`)
//! - result exports (CSV/JSON) (`export`)

pub mod adjust;
pub mod export;
pub mod ingest;

pub use adjust::*;
pub use export::*;
pub use ingest::*;
