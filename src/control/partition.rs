//! Cohort partitioning: split an ordered run of years into Republican,
//! Democrat, and split-control cohorts under one control definition.
//!
//! The partition is total and disjoint over the records inside the year
//! window. Input order is preserved inside each cohort; records are never
//! re-sorted here.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::control::classifier::Classifier;
use crate::domain::{ControlDefinition, ControlLabel, FiscalYearRecord, OnFault, YearWindow};
use crate::error::ValidationError;

/// One record and the label it received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedYear<'a> {
    pub record: &'a FiscalYearRecord,
    pub label: ControlLabel,
}

/// Output of a partitioning pass.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub definition: ControlDefinition,
    pub window: YearWindow,
    /// Every classified record, in input order.
    pub classified: Vec<ClassifiedYear<'a>>,
    cohorts: BTreeMap<ControlLabel, Vec<&'a FiscalYearRecord>>,
    /// Integrity faults tolerated while classifying (`IntegrityMode::Report`).
    pub faults: Vec<ValidationError>,
    /// Records left out of every cohort (`OnFault::Skip`).
    pub skipped: Vec<ValidationError>,
}

impl<'a> Partition<'a> {
    /// A partition with no records, e.g. for a window outside the data.
    pub fn empty(definition: ControlDefinition, window: YearWindow) -> Self {
        Partition {
            definition,
            window,
            classified: Vec::new(),
            cohorts: ControlLabel::ALL.into_iter().map(|label| (label, Vec::new())).collect(),
            faults: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Records carrying `label`, in input order. Empty cohorts are valid.
    pub fn cohort(&self, label: ControlLabel) -> &[&'a FiscalYearRecord] {
        self.cohorts.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(label, cohort)` pairs in `ControlLabel::ALL` order.
    pub fn cohorts(&self) -> impl Iterator<Item = (ControlLabel, &[&'a FiscalYearRecord])> + '_ {
        ControlLabel::ALL.into_iter().map(move |label| (label, self.cohort(label)))
    }

    /// Number of records placed in some cohort.
    pub fn len(&self) -> usize {
        self.classified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classified.is_empty()
    }

    /// Label assigned to `year`, if that year was partitioned.
    pub fn label_of(&self, year: i32) -> Option<ControlLabel> {
        self.classified
            .iter()
            .find(|c| c.record.year == year)
            .map(|c| c.label)
    }
}

/// Classifier plus the policy for records that fail classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    pub classifier: Classifier,
    pub on_fault: OnFault,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            classifier: Classifier::default(),
            on_fault: OnFault::Abort,
        }
    }
}

impl Partitioner {
    pub fn new(classifier: Classifier, on_fault: OnFault) -> Self {
        Self { classifier, on_fault }
    }

    /// Partition `records` that fall inside `window` under `definition`.
    ///
    /// Accepts any iterator of borrowed records, so an existing cohort can be
    /// re-partitioned directly.
    pub fn partition<'a, I>(
        &self,
        records: I,
        definition: ControlDefinition,
        window: &YearWindow,
    ) -> Result<Partition<'a>, ValidationError>
    where
        I: IntoIterator<Item = &'a FiscalYearRecord>,
    {
        window.validate()?;

        let mut cohorts: BTreeMap<ControlLabel, Vec<&'a FiscalYearRecord>> =
            ControlLabel::ALL.into_iter().map(|label| (label, Vec::new())).collect();
        let mut classified = Vec::new();
        let mut faults = Vec::new();
        let mut skipped = Vec::new();

        for record in records.into_iter().filter(|r| window.contains(r.year)) {
            match self.classifier.classify(record, definition) {
                Ok(c) => {
                    faults.extend(c.faults);
                    cohorts.entry(c.label).or_default().push(record);
                    classified.push(ClassifiedYear {
                        record,
                        label: c.label,
                    });
                }
                Err(err) => match self.on_fault {
                    OnFault::Abort => return Err(err),
                    OnFault::Skip => {
                        warn!(year = record.year, "skipping record: {err}");
                        skipped.push(err);
                    }
                },
            }
        }

        let partition = Partition {
            definition,
            window: *window,
            classified,
            cohorts,
            faults,
            skipped,
        };

        debug!(
            definition = definition.short_name(),
            window = %window,
            republican = partition.cohort(ControlLabel::Republican).len(),
            democrat = partition.cohort(ControlLabel::Democrat).len(),
            split = partition.cohort(ControlLabel::Split).len(),
            skipped = partition.skipped.len(),
            "partitioned records"
        );

        Ok(partition)
    }
}
