//! Export classified years to CSV and cohort summaries to JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::control::Partition;
use crate::domain::{Chamber, ChamberSeats, FiscalField};
use crate::error::AppError;
use crate::report::SummaryTable;
use crate::report::format::value_name;

/// Write one row per classified year to a CSV file.
pub fn write_classification_csv(path: &Path, partition: &Partition<'_>) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header: Vec<String> = ["year", "president", "president_party", "definition", "label"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(seat_header(Chamber::Senate));
    header.extend(seat_header(Chamber::House));
    header.extend(FiscalField::ALL.iter().map(|f| f.column_name().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let definition = value_name(partition.definition);
    for c in &partition.classified {
        let r = c.record;
        let mut row = vec![
            r.year.to_string(),
            r.president.clone().unwrap_or_default(),
            r.president_party.display_name().to_string(),
            definition.clone(),
            value_name(c.label),
        ];
        row.extend(seat_cells(r.chamber(Chamber::Senate)));
        row.extend(seat_cells(r.chamber(Chamber::House)));
        row.extend(
            FiscalField::ALL
                .iter()
                .map(|&f| r.value(f).map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))?;

    Ok(())
}

/// Summary JSON envelope.
#[derive(Debug, Serialize)]
struct SummaryFile<'a> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    table: &'a SummaryTable,
}

/// Write the summary table as pretty JSON.
pub fn write_summary_json(path: &Path, table: &SummaryTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    let doc = SummaryFile {
        tool: "fiscal",
        generated_at: Utc::now(),
        table,
    };
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(4, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}

fn seat_header(chamber: Chamber) -> [String; 4] {
    let stem = chamber.column_stem();
    ["dem", "rep", "other", "total"].map(|party| format!("{party}_{stem}seats"))
}

fn seat_cells(seats: Option<&ChamberSeats>) -> [String; 4] {
    match seats {
        Some(s) => [s.dem, s.rep, s.other, s.total].map(|n| n.to_string()),
        None => Default::default(),
    }
}
