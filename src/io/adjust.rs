//! Load-time value overrides.
//!
//! Some years need a value patched before analysis (for example the latest
//! year's deficit replaced by a newer projection). Overrides live in a JSON
//! file so the data CSV stays untouched:
//!
//! ```json
//! [
//!   { "year": 2021, "values": { "deficit_gdp": -13.406 }, "note": "CBO July 2021 projection" }
//! ]
//! ```
//!
//! Overrides are applied once, right after ingest and before any
//! classification, so every downstream step sees the same records.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{FiscalField, FiscalYearRecord};
use crate::error::AppError;

/// Replacement values for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub year: i32,
    pub values: BTreeMap<FiscalField, f64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// One value actually changed by an adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedAdjustment {
    pub year: i32,
    pub field: FiscalField,
    pub previous: Option<f64>,
    pub value: f64,
    pub note: Option<String>,
}

/// Read an adjustments JSON file.
pub fn load_adjustments(path: &Path) -> Result<Vec<Adjustment>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open adjustments JSON '{}': {e}", path.display())))?;
    let adjustments: Vec<Adjustment> = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid adjustments JSON '{}': {e}", path.display())))?;

    for adj in &adjustments {
        if let Some((field, v)) = adj.values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AppError::new(
                2,
                format!("Adjustment for {} sets `{}` to a non-finite value ({v}).", adj.year, field.column_name()),
            ));
        }
    }

    Ok(adjustments)
}

/// Apply adjustments in file order. Later entries for the same year and
/// field win.
///
/// `records` must be sorted by year (as ingest returns them). An adjustment
/// for a year that is not in the data is an error.
pub fn apply_adjustments(
    records: &mut [FiscalYearRecord],
    adjustments: &[Adjustment],
) -> Result<Vec<AppliedAdjustment>, AppError> {
    let mut applied = Vec::new();

    for adj in adjustments {
        let idx = records
            .binary_search_by_key(&adj.year, |r| r.year)
            .map_err(|_| AppError::new(3, format!("Adjustment targets year {} which is not in the data.", adj.year)))?;
        let record = &mut records[idx];

        for (&field, &value) in &adj.values {
            let previous = record.value(field);
            record.fiscal.set(field, Some(value));
            info!(
                year = adj.year,
                field = field.column_name(),
                ?previous,
                value,
                "applied adjustment"
            );
            applied.push(AppliedAdjustment {
                year: adj.year,
                field,
                previous,
                value,
                note: adj.note.clone(),
            });
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::domain::{FiscalValues, Party};

    fn record(year: i32, deficit: Option<f64>) -> FiscalYearRecord {
        let mut fiscal = FiscalValues::default();
        fiscal.set(FiscalField::Deficit, deficit);
        FiscalYearRecord {
            year,
            president: None,
            president_party: Party::Democrat,
            fiscal,
            senate: None,
            house: None,
        }
    }

    #[test]
    fn parses_file_and_overrides_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"year": 2021, "values": {{"deficit_gdp": -13.406}}, "note": "CBO July 2021"}}]"#
        )
        .unwrap();

        let adjustments = load_adjustments(file.path()).unwrap();
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].values.get(&FiscalField::Deficit), Some(&-13.406));

        let mut records = vec![record(2020, Some(-15.0)), record(2021, Some(-10.3))];
        let applied = apply_adjustments(&mut records, &adjustments).unwrap();

        assert_eq!(records[1].value(FiscalField::Deficit), Some(-13.406));
        assert_eq!(records[0].value(FiscalField::Deficit), Some(-15.0));
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].previous, Some(-10.3));
        assert_eq!(applied[0].note.as_deref(), Some("CBO July 2021"));
    }

    #[test]
    fn fills_a_missing_value() {
        let mut records = vec![record(2021, None)];
        let adj = Adjustment {
            year: 2021,
            values: BTreeMap::from([(FiscalField::Receipts, 16.3)]),
            note: None,
        };
        apply_adjustments(&mut records, &[adj]).unwrap();
        assert_eq!(records[0].value(FiscalField::Receipts), Some(16.3));
    }

    #[test]
    fn later_entries_win() {
        let mut records = vec![record(2021, Some(-10.0))];
        let first = Adjustment {
            year: 2021,
            values: BTreeMap::from([(FiscalField::Deficit, -12.0)]),
            note: None,
        };
        let second = Adjustment {
            values: BTreeMap::from([(FiscalField::Deficit, -13.0)]),
            ..first.clone()
        };
        apply_adjustments(&mut records, &[first, second]).unwrap();
        assert_eq!(records[0].value(FiscalField::Deficit), Some(-13.0));
    }

    #[test]
    fn unknown_year_is_rejected() {
        let mut records = vec![record(2020, Some(-15.0))];
        let adj = Adjustment {
            year: 2031,
            values: BTreeMap::from([(FiscalField::Deficit, -6.0)]),
            note: None,
        };
        let err = apply_adjustments(&mut records, &[adj]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("2031"));
    }

    #[test]
    fn unknown_field_name_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"year": 2021, "values": {{"gdp": 1.0}}}}]"#).unwrap();
        let err = load_adjustments(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
