//! Shared load/partition logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> adjustments -> classification/partitioning
//!
//! The subcommands can then focus on which statistics to compute and print.

use tracing::debug;

use crate::control::{Classifier, Partition, Partitioner};
use crate::domain::{AnalysisConfig, ControlDefinition, FiscalYearRecord, YearWindow};
use crate::error::AppError;
use crate::io::adjust::{AppliedAdjustment, apply_adjustments, load_adjustments};
use crate::io::ingest::{IngestedData, load_records};

/// Loaded, adjusted dataset. Partitions borrow records from here.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub ingest: IngestedData,
    pub adjustments: Vec<AppliedAdjustment>,
}

impl Dataset {
    pub fn records(&self) -> &[FiscalYearRecord] {
        &self.ingest.records
    }
}

/// Ingest the CSV and apply any configured adjustments.
pub fn load_dataset(config: &AnalysisConfig) -> Result<Dataset, AppError> {
    config.window.validate()?;

    let mut ingest = load_records(config)?;

    let adjustments = match &config.adjustments_path {
        Some(path) => {
            let adjustments = load_adjustments(path)?;
            apply_adjustments(&mut ingest.records, &adjustments)?
        }
        None => Vec::new(),
    };

    Ok(Dataset { ingest, adjustments })
}

pub fn partitioner(config: &AnalysisConfig) -> Partitioner {
    Partitioner::new(Classifier::new(config.majority, config.integrity), config.on_fault)
}

/// Partition under one definition, inside the run window narrowed by `window`.
///
/// A `window` that shares no year with the run window gives an empty
/// partition labeled with `window` itself.
pub fn partition<'a>(
    dataset: &'a Dataset,
    config: &AnalysisConfig,
    definition: ControlDefinition,
    window: &YearWindow,
) -> Result<Partition<'a>, AppError> {
    window.validate()?;

    let partition = match config.window.intersect(window) {
        Some(narrowed) => partitioner(config).partition(dataset.records(), definition, &narrowed)?,
        None => Partition::empty(definition, *window),
    };
    if partition.is_empty() {
        debug!(definition = definition.short_name(), window = %partition.window, "no records in window");
    }
    Ok(partition)
}

/// Partition every `(window, definition)` pair, window-major.
///
/// No windows means the run window alone.
pub fn partition_grid<'a>(
    dataset: &'a Dataset,
    config: &AnalysisConfig,
    definitions: &[ControlDefinition],
    windows: &[YearWindow],
) -> Result<Vec<Partition<'a>>, AppError> {
    let full = [YearWindow::full()];
    let windows = if windows.is_empty() { &full[..] } else { windows };

    let mut out = Vec::with_capacity(windows.len() * definitions.len());
    for window in windows {
        for &definition in definitions {
            out.push(partition(dataset, config, definition, window)?);
        }
    }
    Ok(out)
}
