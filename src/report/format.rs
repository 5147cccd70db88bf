//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the classification/statistics code stays clean and testable
//! - output changes are localized

use clap::ValueEnum;

use crate::control::Partition;
use crate::domain::{AnalysisConfig, Chamber, ChamberSeats, ControlLabel, FiscalField};
use crate::io::adjust::AppliedAdjustment;
use crate::io::ingest::IngestedData;
use crate::math::CohortSummary;
use crate::report::{CohortComparison, RegressionRow, SummaryTable};

const LABEL_WIDTH: usize = 20;
const CELL_WIDTH: usize = 22;

/// Dataset and policy header printed above every command's output.
pub fn format_run_header(ingest: &IngestedData, adjustments: &[AppliedAdjustment], config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== fiscal - deficits by party control ===\n");
    out.push_str(&format!("Data: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Records: n={} | years={}-{} | rows read={} | row errors={}\n",
        ingest.stats.n_records,
        ingest.stats.year_min,
        ingest.stats.year_max,
        ingest.rows_read,
        ingest.row_errors.len(),
    ));
    let chambers: Vec<&str> = [
        (ingest.stats.has_senate, "Senate"),
        (ingest.stats.has_house, "House"),
    ]
    .into_iter()
    .filter_map(|(present, name)| present.then_some(name))
    .collect();
    if chambers.is_empty() {
        out.push_str("Chambers: none\n");
    } else {
        out.push_str(&format!("Chambers: {}\n", chambers.join(", ")));
    }
    if !ingest.year_gaps.is_empty() {
        let gaps: Vec<String> = ingest
            .year_gaps
            .iter()
            .map(|&(a, b)| if a == b { a.to_string() } else { format!("{a}-{b}") })
            .collect();
        out.push_str(&format!("Missing years: {}\n", gaps.join(", ")));
    }
    out.push_str(&format!(
        "Majority rule: {} | integrity: {} | on fault: {} | window: {}\n",
        value_name(config.majority),
        value_name(config.integrity),
        value_name(config.on_fault),
        config.window,
    ));

    for adj in adjustments {
        out.push_str(&format!(
            "Adjusted {} {}: {} -> {:.3}",
            adj.year,
            adj.field.column_name(),
            adj.previous.map(|v| format!("{v:.3}")).unwrap_or_else(|| "missing".to_string()),
            adj.value,
        ));
        if let Some(note) = &adj.note {
            out.push_str(&format!(" ({note})"));
        }
        out.push('\n');
    }

    out
}

/// Year-by-year classification listing for one partition.
pub fn format_classification(partition: &Partition<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} | {}\n\n",
        partition.definition.display_name(),
        partition.window
    ));

    out.push_str(
        format!(
            "{:<6} {:<16} {:<10} {:>15} {:>15} {:<18}\n",
            "year", "president", "party", "senate D/R/O", "house D/R/O", "control"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<6} {:-<16} {:-<10} {:->15} {:->15} {:-<18}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for c in &partition.classified {
        let r = c.record;
        out.push_str(
            format!(
                "{:<6} {:<16} {:<10} {:>15} {:>15} {:<18}\n",
                r.year,
                truncate(r.president.as_deref().unwrap_or(""), 16),
                r.president_party.display_name(),
                fmt_seats(r.chamber(Chamber::Senate)),
                fmt_seats(r.chamber(Chamber::House)),
                c.label.display_name(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push('\n');
    for (label, cohort) in partition.cohorts() {
        out.push_str(&format!("{:<LABEL_WIDTH$} {} years\n", label.display_name(), cohort.len()));
    }
    out.push_str(&format_faults(partition));

    out
}

/// Summary tables, one block per `(window, field)` with a column per definition.
pub fn format_summary_table(table: &SummaryTable) -> String {
    let mut out = String::new();

    for window in &table.windows {
        for &field in &table.fields {
            out.push_str(&format!("{} | {}\n", field_title(field), window));

            let mut header = format!("{:<LABEL_WIDTH$}", "");
            for def in &table.definitions {
                header.push_str(&format!(" {:>CELL_WIDTH$}", def.short_name()));
            }
            out.push_str(header.trim_end());
            out.push('\n');

            let mut rule = format!("{:-<LABEL_WIDTH$}", "");
            for _ in &table.definitions {
                rule.push_str(&format!(" {:->CELL_WIDTH$}", ""));
            }
            out.push_str(&rule);
            out.push('\n');

            for label in ControlLabel::ALL {
                let mut line = format!("{:<LABEL_WIDTH$}", label.display_name());
                for &def in &table.definitions {
                    let cell = table
                        .row(def, window, field)
                        .and_then(|row| row.cohort(label))
                        .map(fmt_summary)
                        .unwrap_or_else(|| "-".to_string());
                    line.push_str(&format!(" {cell:>CELL_WIDTH$}"));
                }
                out.push_str(line.trim_end());
                out.push('\n');
            }

            let skipped: Vec<i32> = table
                .rows
                .iter()
                .filter(|r| r.window == *window && r.field == field)
                .flat_map(|r| r.skipped_years.iter().copied())
                .collect();
            if !skipped.is_empty() {
                let mut years = skipped;
                years.sort_unstable();
                years.dedup();
                let years: Vec<String> = years.iter().map(i32::to_string).collect();
                out.push_str(&format!("(skipped years: {})\n", years.join(", ")));
            }

            out.push('\n');
        }
    }

    out.push_str("Cells: mean (sample std) n=count\n");
    out
}

/// One-sided cohort comparison.
pub fn format_comparison(cmp: &CohortComparison) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} | {} | {}\n\n",
        field_title(cmp.field),
        cmp.definition.display_name(),
        cmp.window
    ));
    out.push_str(&format!(
        "{:<LABEL_WIDTH$} {}\n",
        cmp.cohort.display_name(),
        fmt_summary(&cmp.cohort_summary)
    ));
    out.push_str(&format!(
        "{:<LABEL_WIDTH$} {}\n\n",
        cmp.against.display_name(),
        fmt_summary(&cmp.against_summary)
    ));

    match &cmp.test {
        Some(test) => {
            out.push_str(&format!(
                "t = {:.4} (scaled by {} std) | df = {} | one-sided p = {:.4}\n",
                test.t_stat,
                cmp.cohort.display_name(),
                test.df,
                test.p_value
            ));
        }
        None => {
            out.push_str("t-test undefined: each cohort needs at least 2 values and a positive std.\n");
        }
    }

    out
}

/// Seat-share regression rows.
pub fn format_regression(partition: &Partition<'_>, field: FiscalField, chamber: Chamber, rows: &[RegressionRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} vs Democrat {} seat share | {} | {}\n\n",
        field_title(field),
        chamber,
        partition.definition.display_name(),
        partition.window
    ));

    out.push_str(
        format!(
            "{:<LABEL_WIDTH$} {:>6} {:>6} {:>12} {:>12} {:>8}\n",
            "cohort", "years", "n", "intercept", "slope", "r^2"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<LABEL_WIDTH$} {:->6} {:->6} {:->12} {:->12} {:->8}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for row in rows {
        let name = row.cohort.map(ControlLabel::display_name).unwrap_or("All years");
        let line = match &row.fit {
            Some(fit) => format!(
                "{:<LABEL_WIDTH$} {:>6} {:>6} {:>12.3} {:>12.3} {:>8}\n",
                name,
                row.n_records,
                fit.n,
                fit.intercept,
                fit.slope,
                fmt_num(fit.r_squared, 3),
            ),
            None => format!(
                "{:<LABEL_WIDTH$} {:>6} {:>6} {:>12} {:>12} {:>8}\n",
                name, row.n_records, "-", "-", "-", "-"
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str("\nSlope is percentage points of GDP per unit of seat share.\n");
    out.push_str(&format_faults(partition));
    out
}

fn format_faults(partition: &Partition<'_>) -> String {
    let mut out = String::new();
    if !partition.faults.is_empty() {
        out.push_str("\nIntegrity warnings:\n");
        for fault in &partition.faults {
            out.push_str(&format!("- {fault}\n"));
        }
    }
    if !partition.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for fault in &partition.skipped {
            out.push_str(&format!("- {fault}\n"));
        }
    }
    out
}

fn field_title(field: FiscalField) -> String {
    let name = field.display_name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn fmt_summary(s: &CohortSummary) -> String {
    format!("{} ({}) n={}", fmt_num(s.mean, 2), fmt_num(s.std, 2), s.count)
}

fn fmt_seats(seats: Option<&ChamberSeats>) -> String {
    match seats {
        Some(s) => format!("{}/{}/{}", s.dem, s.rep, s.other),
        None => "-".to_string(),
    }
}

fn fmt_num(v: f64, precision: usize) -> String {
    if v.is_finite() {
        format!("{v:.precision$}")
    } else {
        "-".to_string()
    }
}

/// CLI name of a `ValueEnum` value (`at-least-half`, `senate`, ...).
pub(crate) fn value_name<T: ValueEnum>(v: T) -> String {
    v.to_possible_value()
        .map(|p| p.get_name().to_string())
        .unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::control::Partitioner;
    use crate::domain::{
        ControlDefinition, FiscalValues, FiscalYearRecord, IntegrityMode, MajorityRule, OnFault, Party, YearWindow,
    };
    use crate::io::ingest::DatasetStats;
    use crate::report::{build_summary_table, compare_cohorts, regress_on_seat_share};

    fn record(year: i32, party: Party, senate_dem: u32, deficit: f64) -> FiscalYearRecord {
        let mut fiscal = FiscalValues::default();
        fiscal.set(FiscalField::Deficit, Some(deficit));
        FiscalYearRecord {
            year,
            president: Some("Eisenhower".to_string()),
            president_party: party,
            fiscal,
            senate: Some(ChamberSeats::new(senate_dem, 100 - senate_dem, 0, 100)),
            house: None,
        }
    }

    fn history() -> Vec<FiscalYearRecord> {
        vec![
            record(1953, Party::Republican, 47, -1.7),
            record(1954, Party::Republican, 47, -0.3),
            record(1957, Party::Republican, 51, 0.8),
            record(1961, Party::Democrat, 64, -0.6),
            record(1962, Party::Democrat, 64, -1.2),
        ]
    }

    #[test]
    fn summary_table_prints_each_cohort_with_counts() {
        let data = history();
        let partition = Partitioner::default()
            .partition(&data, ControlDefinition::Senate, &YearWindow::full())
            .unwrap();
        let table = build_summary_table(std::slice::from_ref(&partition), &[FiscalField::Deficit]);
        let text = format_summary_table(&table);

        assert!(text.contains("Deficits-to-GDP | all years"));
        assert!(text.contains("WH+Sen"));
        assert!(text.contains("-1.00 (0.99) n=2"));
        assert!(text.contains("0.80 (-) n=1"));
        assert!(text.lines().any(|l| l.starts_with("Split control")));
    }

    #[test]
    fn classification_listing_shows_labels_and_totals() {
        let data = history();
        let partition = Partitioner::default()
            .partition(&data, ControlDefinition::Senate, &YearWindow::full())
            .unwrap();
        let text = format_classification(&partition);
        assert!(text.contains("1957"));
        assert!(text.contains("51/49/0"));
        assert!(text.contains("Split control        1 years"));
        assert!(text.contains("Republican control   2 years"));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn missing_chamber_faults_are_listed_when_skipped() {
        let data = history();
        let partition = Partitioner::new(Default::default(), OnFault::Skip)
            .partition(&data, ControlDefinition::House, &YearWindow::full())
            .unwrap();
        let text = format_classification(&partition);
        assert!(text.contains("Skipped:"));
        assert!(text.contains("year 1953"));
    }

    #[test]
    fn comparison_prints_statistic_or_explains_why_not() {
        let data = history();
        let partition = Partitioner::default()
            .partition(&data, ControlDefinition::Senate, &YearWindow::full())
            .unwrap();

        let cmp = compare_cohorts(&partition, FiscalField::Deficit, ControlLabel::Republican, ControlLabel::Democrat);
        let text = format_comparison(&cmp);
        assert!(text.contains("df = 1"));
        assert!(text.contains("one-sided p ="));

        let cmp = compare_cohorts(&partition, FiscalField::Deficit, ControlLabel::Split, ControlLabel::Democrat);
        assert!(format_comparison(&cmp).contains("t-test undefined"));
    }

    #[test]
    fn regression_output_marks_unfit_rows() {
        let data = history();
        let partition = Partitioner::default()
            .partition(&data, ControlDefinition::Senate, &YearWindow::full())
            .unwrap();
        let rows = regress_on_seat_share(&partition, FiscalField::Deficit, Chamber::Senate);
        let text = format_regression(&partition, FiscalField::Deficit, Chamber::Senate, &rows);
        assert!(text.contains("Democrat Senate seat share"));
        assert!(text.lines().any(|l| l.starts_with("All years") && !l.ends_with('-')));
        assert!(text.lines().any(|l| l.starts_with("Split control") && l.ends_with('-')));
    }

    #[test]
    fn header_lists_gaps_and_adjustments() {
        let ingest = IngestedData {
            records: history(),
            stats: DatasetStats {
                n_records: 5,
                year_min: 1953,
                year_max: 1962,
                has_senate: true,
                has_house: false,
            },
            row_errors: Vec::new(),
            year_gaps: vec![(1955, 1956), (1958, 1960)],
            rows_read: 5,
            rows_used: 5,
        };
        let adjustments = vec![AppliedAdjustment {
            year: 1962,
            field: FiscalField::Deficit,
            previous: Some(-1.2),
            value: -1.3,
            note: Some("revised".to_string()),
        }];
        let config = AnalysisConfig {
            data_path: PathBuf::from("party_control.csv"),
            skip_rows: 0,
            adjustments_path: None,
            window: YearWindow::full(),
            majority: MajorityRule::AtLeastHalf,
            integrity: IntegrityMode::Report,
            on_fault: OnFault::Abort,
        };

        let text = format_run_header(&ingest, &adjustments, &config);
        assert!(text.contains("Chambers: Senate\n"));
        assert!(text.contains("Missing years: 1955-1956, 1958-1960"));
        assert!(text.contains("Majority rule: at-least-half"));
        assert!(text.contains("Adjusted 1962 deficit_gdp: -1.200 -> -1.300 (revised)"));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Eisenhower", 16), "Eisenhower");
        assert_eq!(truncate("Franklin Roosevelt", 8), "Frankli.");
    }
}
