//! Reporting: cohort summary tables, cohort comparisons, and seat-share
//! regressions, plus their terminal formatting (`format`).
//!
//! Everything here consumes finished partitions; nothing re-classifies.

use rayon::prelude::*;
use serde::Serialize;

use crate::control::Partition;
use crate::domain::{Chamber, ControlDefinition, ControlLabel, FiscalField, FiscalYearRecord, YearWindow};
use crate::math::{CohortSummary, LinearFit, OneSidedTest, one_sided_test, simple_regression, summarize_cohort};

pub mod format;

pub use format::*;

/// One cohort's statistics inside a summary row.
#[derive(Debug, Clone, Serialize)]
pub struct CohortCell {
    pub label: ControlLabel,
    #[serde(flatten)]
    pub summary: CohortSummary,
}

/// Cohort statistics for one `(definition, window, field)` combination.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub definition: ControlDefinition,
    pub window: YearWindow,
    pub field: FiscalField,
    /// In `ControlLabel::ALL` order.
    pub cohorts: Vec<CohortCell>,
    pub skipped_years: Vec<i32>,
}

impl SummaryRow {
    pub fn cohort(&self, label: ControlLabel) -> Option<&CohortSummary> {
        self.cohorts.iter().find(|c| c.label == label).map(|c| &c.summary)
    }
}

/// The full summary table. Non-finite statistics serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryTable {
    pub fields: Vec<FiscalField>,
    pub windows: Vec<YearWindow>,
    pub definitions: Vec<ControlDefinition>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn row(&self, definition: ControlDefinition, window: &YearWindow, field: FiscalField) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|r| r.definition == definition && r.window == *window && r.field == field)
    }
}

/// Summarize every field for every partition.
///
/// Cells are computed in parallel; row order follows `partitions` then `fields`.
pub fn build_summary_table(partitions: &[Partition<'_>], fields: &[FiscalField]) -> SummaryTable {
    let cells: Vec<(&Partition<'_>, FiscalField)> = partitions
        .iter()
        .flat_map(|p| fields.iter().map(move |&f| (p, f)))
        .collect();

    let rows: Vec<SummaryRow> = cells
        .par_iter()
        .map(|&(partition, field)| SummaryRow {
            definition: partition.definition,
            window: partition.window,
            field,
            cohorts: partition
                .cohorts()
                .map(|(label, records)| CohortCell {
                    label,
                    summary: summarize_cohort(records, field),
                })
                .collect(),
            skipped_years: partition.skipped.iter().filter_map(|e| e.year()).collect(),
        })
        .collect();

    SummaryTable {
        fields: fields.to_vec(),
        windows: unique_in_order(partitions.iter().map(|p| p.window)),
        definitions: unique_in_order(partitions.iter().map(|p| p.definition)),
        rows,
    }
}

fn unique_in_order<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// One-sided comparison of two cohorts of the same partition.
#[derive(Debug, Clone, Serialize)]
pub struct CohortComparison {
    pub definition: ControlDefinition,
    pub window: YearWindow,
    pub field: FiscalField,
    pub cohort: ControlLabel,
    pub against: ControlLabel,
    pub cohort_summary: CohortSummary,
    pub against_summary: CohortSummary,
    /// `None` when the statistic is undefined for these cohorts.
    pub test: Option<OneSidedTest>,
}

pub fn compare_cohorts(
    partition: &Partition<'_>,
    field: FiscalField,
    cohort: ControlLabel,
    against: ControlLabel,
) -> CohortComparison {
    let cohort_summary = summarize_cohort(partition.cohort(cohort), field);
    let against_summary = summarize_cohort(partition.cohort(against), field);
    CohortComparison {
        definition: partition.definition,
        window: partition.window,
        field,
        cohort,
        against,
        cohort_summary,
        against_summary,
        test: one_sided_test(&cohort_summary, &against_summary),
    }
}

/// Regression of a field on Democrat seat share, for all years or one cohort.
#[derive(Debug, Clone, Serialize)]
pub struct RegressionRow {
    /// `None` for the all-years row.
    pub cohort: Option<ControlLabel>,
    pub n_records: usize,
    pub fit: Option<LinearFit>,
}

/// Regress `field` on the Democrat share of `chamber`, overall and per cohort.
pub fn regress_on_seat_share(partition: &Partition<'_>, field: FiscalField, chamber: Chamber) -> Vec<RegressionRow> {
    let all: Vec<&FiscalYearRecord> = partition.classified.iter().map(|c| c.record).collect();

    let mut rows = vec![RegressionRow {
        cohort: None,
        n_records: all.len(),
        fit: regress_records(&all, field, chamber),
    }];
    rows.extend(partition.cohorts().map(|(label, records)| RegressionRow {
        cohort: Some(label),
        n_records: records.len(),
        fit: regress_records(records, field, chamber),
    }));
    rows
}

fn regress_records(records: &[&FiscalYearRecord], field: FiscalField, chamber: Chamber) -> Option<LinearFit> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = records
        .iter()
        .map(|r| {
            let x = r.chamber(chamber).and_then(|s| s.dem_share()).unwrap_or(f64::NAN);
            let y = r.value(field).unwrap_or(f64::NAN);
            (x, y)
        })
        .unzip();
    simple_regression(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Partitioner;
    use crate::domain::{ChamberSeats, FiscalValues, Party};

    fn record(year: i32, party: Party, senate_dem: u32, deficit: f64) -> FiscalYearRecord {
        let mut fiscal = FiscalValues::default();
        fiscal.set(FiscalField::Deficit, Some(deficit));
        fiscal.set(FiscalField::Receipts, Some(17.0 + deficit / 10.0));
        FiscalYearRecord {
            year,
            president: None,
            president_party: party,
            fiscal,
            senate: Some(ChamberSeats::new(senate_dem, 100 - senate_dem, 0, 100)),
            house: Some(ChamberSeats::new(200, 235, 0, 435)),
        }
    }

    fn history() -> Vec<FiscalYearRecord> {
        vec![
            record(2001, Party::Republican, 45, -1.0),
            record(2002, Party::Republican, 46, -3.0),
            record(2003, Party::Republican, 48, -3.4),
            record(2009, Party::Democrat, 58, -9.8),
            record(2010, Party::Democrat, 59, -8.6),
            record(2011, Party::Democrat, 53, -8.4),
        ]
    }

    #[test]
    fn summary_table_covers_every_cell_in_order() {
        let data = history();
        let partitioner = Partitioner::default();
        let windows = [YearWindow::full(), YearWindow::new(None, Some(2009))];

        let mut partitions = Vec::new();
        for window in &windows {
            for definition in [ControlDefinition::Senate, ControlDefinition::House] {
                partitions.push(partitioner.partition(&data, definition, window).unwrap());
            }
        }

        let fields = [FiscalField::Deficit, FiscalField::Receipts];
        let table = build_summary_table(&partitions, &fields);

        assert_eq!(table.rows.len(), 8);
        assert_eq!(table.windows, windows.to_vec());
        assert_eq!(table.rows[0].definition, ControlDefinition::Senate);
        assert_eq!(table.rows[0].field, FiscalField::Deficit);
        assert_eq!(table.rows[1].field, FiscalField::Receipts);

        let row = table
            .row(ControlDefinition::Senate, &YearWindow::full(), FiscalField::Deficit)
            .unwrap();
        let rep = row.cohort(ControlLabel::Republican).unwrap();
        assert_eq!(rep.count, 3);
        assert!((rep.mean - (-7.4 / 3.0)).abs() < 1e-9);
        assert_eq!(row.cohort(ControlLabel::Democrat).unwrap().count, 3);
        assert_eq!(row.cohort(ControlLabel::Split).unwrap().count, 0);

        // House is Republican all along, so Democrat years are split there.
        let house = table
            .row(ControlDefinition::House, &YearWindow::full(), FiscalField::Deficit)
            .unwrap();
        assert_eq!(house.cohort(ControlLabel::Split).unwrap().count, 3);

        let narrowed = table
            .row(ControlDefinition::Senate, &YearWindow::new(None, Some(2009)), FiscalField::Deficit)
            .unwrap();
        assert_eq!(narrowed.cohort(ControlLabel::Democrat).unwrap().count, 1);
    }

    #[test]
    fn comparison_runs_the_one_sided_test() {
        let data = history();
        let partition = Partitioner::default()
            .partition(&data, ControlDefinition::Senate, &YearWindow::full())
            .unwrap();
        let cmp = compare_cohorts(&partition, FiscalField::Deficit, ControlLabel::Republican, ControlLabel::Democrat);
        let test = cmp.test.unwrap();
        assert_eq!(test.df, 2);
        assert!(test.t_stat > 0.0);
        assert_eq!(cmp.cohort_summary.count, 3);

        let undefined = compare_cohorts(&partition, FiscalField::Deficit, ControlLabel::Split, ControlLabel::Democrat);
        assert!(undefined.test.is_none());
    }

    #[test]
    fn regression_rows_cover_all_years_and_each_cohort() {
        let data = history();
        let partition = Partitioner::default()
            .partition(&data, ControlDefinition::Senate, &YearWindow::full())
            .unwrap();
        let rows = regress_on_seat_share(&partition, FiscalField::Deficit, Chamber::Senate);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].cohort, None);
        assert_eq!(rows[0].n_records, 6);
        let overall = rows[0].fit.unwrap();
        assert!(overall.slope < 0.0);

        // No split years, so nothing to fit.
        let split = rows.iter().find(|r| r.cohort == Some(ControlLabel::Split)).unwrap();
        assert_eq!(split.n_records, 0);
        assert!(split.fit.is_none());

        // House shares are constant, so the regressor has no spread.
        let house_rows = regress_on_seat_share(&partition, FiscalField::Deficit, Chamber::House);
        assert!(house_rows[0].fit.is_none());
    }

    #[test]
    fn summary_json_writes_nan_as_null() {
        let cell = CohortCell {
            label: ControlLabel::Split,
            summary: CohortSummary {
                mean: f64::NAN,
                std: f64::NAN,
                count: 0,
            },
        };
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"label":"split","mean":null,"std":null,"count":0}"#);
    }
}
