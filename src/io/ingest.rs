//! CSV ingest and normalization.
//!
//! This module is responsible for turning a party-control dataset CSV into an
//! ordered, validated `Vec<FiscalYearRecord>`.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior**: records come out sorted by year, duplicates rejected
//! - **Separation of concerns**: no classification logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{AnalysisConfig, Chamber, ChamberSeats, FiscalField, FiscalValues, FiscalYearRecord, Party};
use crate::error::AppError;

/// Gap between total spending and its parts above which we log the row.
const SPEND_IDENTITY_TOLERANCE: f64 = 0.05;

/// Summary stats about the records actually loaded.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub year_min: i32,
    pub year_max: i32,
    pub has_senate: bool,
    pub has_house: bool,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub year: Option<i32>,
    pub message: String,
}

/// Ingest output: ordered records + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<FiscalYearRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    /// Inclusive `(first_missing, last_missing)` year ranges.
    pub year_gaps: Vec<(i32, i32)>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Column positions for one chamber.
#[derive(Debug, Clone, Copy)]
struct ChamberColumns {
    dem: usize,
    rep: usize,
    other: usize,
    total: usize,
    dem_majority: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum PresidencyColumn {
    Party(usize),
    /// `dem_whitehouse` 0/1 flag.
    DemFlag(usize),
}

/// Resolved column layout of the input file.
#[derive(Debug, Clone)]
struct Schema {
    year: usize,
    president: Option<usize>,
    presidency: PresidencyColumn,
    fiscal: Vec<(FiscalField, usize)>,
    senate: Option<ChamberColumns>,
    house: Option<ChamberColumns>,
}

/// Load records from the configured CSV file.
pub fn load_records(config: &AnalysisConfig) -> Result<IngestedData, AppError> {
    let file = File::open(&config.data_path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", config.data_path.display()),
        )
    })?;

    let data = read_records(file, config.skip_rows)?;
    info!(
        path = %config.data_path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        row_errors = data.row_errors.len(),
        years = %format!("{}-{}", data.stats.year_min, data.stats.year_max),
        "loaded fiscal records"
    );
    Ok(data)
}

/// Parse records from any reader, skipping `skip_rows` preamble lines first.
pub fn read_records<R: Read>(input: R, skip_rows: usize) -> Result<IngestedData, AppError> {
    let mut input = BufReader::new(input);
    let mut discard = String::new();
    for _ in 0..skip_rows {
        discard.clear();
        let n = input
            .read_line(&mut discard)
            .map_err(|e| AppError::new(2, format!("Failed to read CSV preamble: {e}")))?;
        if n == 0 {
            return Err(AppError::new(
                2,
                format!("CSV ended inside the {skip_rows}-line preamble."),
            ));
        }
    }

    // Kept in memory so row errors can be mapped back to physical lines.
    let mut text = Vec::new();
    input
        .read_to_end(&mut text)
        .map_err(|e| AppError::new(2, format!("Failed to read CSV: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_slice());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let schema = resolve_schema(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    // Physical line of the last record seen, used when the parser has no position.
    let mut last_line = 1 + skip_rows;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| record_start_line(&text, p) + skip_rows)
                    .unwrap_or(last_line + 1);
                last_line = line;
                rows_read += 1;
                row_errors.push(RowError {
                    line,
                    year: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| record_start_line(&text, p) + skip_rows)
            .unwrap_or(last_line + 1);
        last_line = line;

        // Spreadsheet exports often end with rows of empty cells.
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows_read += 1;

        match parse_row(&record, &schema) {
            Ok(row) => {
                if let Some(gap) = row.fiscal.spend_identity_gap() {
                    if gap.abs() > SPEND_IDENTITY_TOLERANCE {
                        debug!(year = row.year, gap, "total spending differs from interest + noninterest");
                    }
                }
                records.push(row);
            }
            Err(message) => {
                let year = get_optional(&record, Some(schema.year)).and_then(|s| s.parse().ok());
                warn!(line, ?year, "skipping row: {message}");
                row_errors.push(RowError { line, year, message });
            }
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after parsing."));
    }

    records.sort_by_key(|r| r.year);
    if let Some(dup) = records.windows(2).find(|w| w[0].year == w[1].year) {
        return Err(AppError::new(
            3,
            format!("Duplicate year {} in input data.", dup[0].year),
        ));
    }

    let year_gaps = find_year_gaps(&records);
    for (from, to) in &year_gaps {
        warn!(from, to, "years missing from input data");
    }

    let stats = DatasetStats {
        n_records: rows_used,
        year_min: records[0].year,
        year_max: records[rows_used - 1].year,
        has_senate: schema.senate.is_some(),
        has_house: schema.house.is_some(),
    };

    Ok(IngestedData {
        records,
        stats,
        row_errors,
        year_gaps,
        rows_read,
        rows_used,
    })
}

/// 1-based line (after the preamble) on which the record at `pos` starts.
///
/// The reader may report the offset right after the previous record, before
/// any blank lines it skipped, so leading line terminators are stepped over.
fn record_start_line(text: &[u8], pos: &csv::Position) -> usize {
    let mut line = pos.line() as usize;
    let start = (pos.byte() as usize).min(text.len());
    for &b in &text[start..] {
        match b {
            b'\n' => line += 1,
            b'\r' => {}
            _ => break,
        }
    }
    line
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel sometimes writes a BOM in front of the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// First column found among `names` (canonical name first, then aliases).
fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn resolve_schema(header_map: &HashMap<String, usize>) -> Result<Schema, AppError> {
    let year = find_column(header_map, &["year"])
        .ok_or_else(|| AppError::new(2, "Missing required column: `year`"))?;

    let presidency = if let Some(idx) = find_column(header_map, &["president_party", "presidentparty"]) {
        PresidencyColumn::Party(idx)
    } else if let Some(idx) = find_column(header_map, &["dem_whitehouse", "demwhitehouse"]) {
        PresidencyColumn::DemFlag(idx)
    } else {
        return Err(AppError::new(
            2,
            "Missing required column: `president_party` (or `dem_whitehouse`)",
        ));
    };

    let fiscal = FiscalField::ALL
        .into_iter()
        .filter_map(|field| header_map.get(field.column_name()).map(|&idx| (field, idx)))
        .collect();

    let senate = resolve_chamber(header_map, Chamber::Senate)?;
    let house = resolve_chamber(header_map, Chamber::House)?;
    if senate.is_none() && house.is_none() {
        return Err(AppError::new(
            2,
            "No chamber seat columns found: expected `dem_senateseats`/`rep_senateseats`/... or the House equivalents.",
        ));
    }

    Ok(Schema {
        year,
        president: find_column(header_map, &["president"]),
        presidency,
        fiscal,
        senate,
        house,
    })
}

/// Resolve one chamber's columns. All four seat columns or none.
fn resolve_chamber(header_map: &HashMap<String, usize>, chamber: Chamber) -> Result<Option<ChamberColumns>, AppError> {
    let stem = chamber.column_stem();
    let names = |parts: &[&str]| -> Vec<String> { parts.iter().map(|p| p.replace("{}", stem)).collect() };

    let lookup = |candidates: Vec<String>| -> Option<usize> {
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        find_column(header_map, &refs)
    };

    let dem = lookup(names(&["dem_{}seats", "dem{}seats"]));
    let rep = lookup(names(&["rep_{}seats", "rep{}seats"]));
    let other = lookup(names(&["other_{}seats", "oth_{}seats", "oth{}seats"]));
    let total = lookup(names(&["total_{}seats", "tot_{}seats", "tot{}seats"]));
    let dem_majority = lookup(names(&["dem_{}_maj", "dem{}maj"]));

    match (dem, rep, other, total) {
        (Some(dem), Some(rep), Some(other), Some(total)) => Ok(Some(ChamberColumns {
            dem,
            rep,
            other,
            total,
            dem_majority,
        })),
        (None, None, None, None) => Ok(None),
        _ => {
            let missing: Vec<String> = [
                ("dem", dem),
                ("rep", rep),
                ("other", other),
                ("total", total),
            ]
            .into_iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(party, _)| format!("`{party}_{stem}seats`"))
            .collect();
            Err(AppError::new(
                2,
                format!("Incomplete {chamber} seat columns; missing {}", missing.join(", ")),
            ))
        }
    }
}

fn parse_row(record: &StringRecord, schema: &Schema) -> Result<FiscalYearRecord, String> {
    let year_raw = get_required(record, Some(schema.year), "year")?;
    let year = year_raw
        .parse::<i32>()
        .map_err(|_| format!("Invalid `year` value '{year_raw}'."))?;

    let president_party = match schema.presidency {
        PresidencyColumn::Party(idx) => get_required(record, Some(idx), "president_party")?.parse::<Party>()?,
        PresidencyColumn::DemFlag(idx) => {
            if parse_flag(get_required(record, Some(idx), "dem_whitehouse")?, "dem_whitehouse")? {
                Party::Democrat
            } else {
                Party::Republican
            }
        }
    };

    let mut fiscal = FiscalValues::default();
    for &(field, idx) in &schema.fiscal {
        fiscal.set(field, parse_opt_f64(get_optional(record, Some(idx))));
    }

    let senate = schema
        .senate
        .map(|cols| parse_chamber(record, &cols, Chamber::Senate))
        .transpose()?;
    let house = schema
        .house
        .map(|cols| parse_chamber(record, &cols, Chamber::House))
        .transpose()?;

    Ok(FiscalYearRecord {
        year,
        president: get_optional(record, schema.president).map(str::to_string),
        president_party,
        fiscal,
        senate,
        house,
    })
}

fn parse_chamber(record: &StringRecord, cols: &ChamberColumns, chamber: Chamber) -> Result<ChamberSeats, String> {
    let stem = chamber.column_stem();
    let count = |idx: usize, party: &str| -> Result<u32, String> {
        let name = format!("{party}_{stem}seats");
        parse_count(get_required(record, Some(idx), &name)?, &name)
    };

    let seats = ChamberSeats::new(
        count(cols.dem, "dem")?,
        count(cols.rep, "rep")?,
        count(cols.other, "other")?,
        count(cols.total, "total")?,
    );

    let field = format!("dem_{stem}_maj");
    match get_optional(record, cols.dem_majority) {
        Some(raw) => Ok(seats.with_recorded_majority(parse_flag(raw, &field)?)),
        None => Ok(seats),
    }
}

fn get_required<'a>(record: &'a StringRecord, idx: Option<usize>, name: &str) -> Result<&'a str, String> {
    get_optional(record, idx).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}

/// Seat counts are integers, but spreadsheet exports may write `52.0`.
fn parse_count(s: &str, name: &str) -> Result<u32, String> {
    if let Ok(v) = s.parse::<u32>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(format!("Invalid `{name}` value '{s}' (expected a non-negative integer).")),
    }
}

fn parse_flag(s: &str, name: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Ok(true),
        "0" | "0.0" | "false" | "no" => Ok(false),
        _ => Err(format!("Invalid `{name}` value '{s}' (expected 0 or 1).")),
    }
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn find_year_gaps(records: &[FiscalYearRecord]) -> Vec<(i32, i32)> {
    records
        .windows(2)
        .filter(|w| w[1].year - w[0].year > 1)
        .map(|w| (w[0].year + 1, w[1].year - 1))
        .collect()
}
