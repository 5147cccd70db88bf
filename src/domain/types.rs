//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during classification and aggregation
//! - exported to JSON/CSV
//! - built directly in tests without going through the CSV loader

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Party of the sitting president. Third parties are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Republican,
    Democrat,
}

impl Party {
    pub fn display_name(self) -> &'static str {
        match self {
            Party::Republican => "Republican",
            Party::Democrat => "Democrat",
        }
    }
}

impl FromStr for Party {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "republican" | "rep" | "r" => Ok(Party::Republican),
            "democrat" | "democratic" | "dem" | "d" => Ok(Party::Democrat),
            _ => Err(format!(
                "Unrecognized party '{}'. Expected Republican or Democrat.",
                s.trim()
            )),
        }
    }
}

/// A chamber of Congress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    Senate,
    House,
}

impl Chamber {
    /// Column prefix used by the input data (`senate` / `house`).
    pub fn column_stem(self) -> &'static str {
        match self {
            Chamber::Senate => "senate",
            Chamber::House => "house",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chamber::Senate => write!(f, "Senate"),
            Chamber::House => write!(f, "House"),
        }
    }
}

/// Seat counts for one chamber in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamberSeats {
    pub dem: u32,
    pub rep: u32,
    pub other: u32,
    pub total: u32,
    /// Democrat-majority flag as recorded in the source data, when present.
    ///
    /// This can disagree with a seat-count majority (e.g. an evenly split
    /// Senate organized by the Vice President's party).
    pub dem_majority_recorded: Option<bool>,
}

impl ChamberSeats {
    pub fn new(dem: u32, rep: u32, other: u32, total: u32) -> Self {
        Self {
            dem,
            rep,
            other,
            total,
            dem_majority_recorded: None,
        }
    }

    pub fn with_recorded_majority(mut self, dem_majority: bool) -> Self {
        self.dem_majority_recorded = Some(dem_majority);
        self
    }

    /// `true` when the three party counts add up to `total`.
    pub fn seat_sum_matches(&self) -> bool {
        u64::from(self.dem) + u64::from(self.rep) + u64::from(self.other) == u64::from(self.total)
    }

    /// Democrat share of the chamber in `[0, 1]`, or `None` for an empty chamber.
    pub fn dem_share(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(f64::from(self.dem) / f64::from(self.total))
    }
}

/// Numeric fiscal variables, each a percent of GDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum FiscalField {
    /// Surplus (+) or deficit (-).
    #[serde(rename = "deficit_gdp")]
    #[value(name = "deficit")]
    Deficit,
    #[serde(rename = "receipts_gdp")]
    #[value(name = "receipts")]
    Receipts,
    #[serde(rename = "spend_nonint_gdp")]
    #[value(name = "noninterest-spend")]
    NonInterestSpend,
    #[serde(rename = "spend_int_gdp")]
    #[value(name = "interest-spend")]
    InterestSpend,
    #[serde(rename = "spend_tot_gdp")]
    #[value(name = "total-spend")]
    TotalSpend,
}

impl FiscalField {
    pub const ALL: [FiscalField; 5] = [
        FiscalField::Deficit,
        FiscalField::Receipts,
        FiscalField::NonInterestSpend,
        FiscalField::InterestSpend,
        FiscalField::TotalSpend,
    ];

    /// Input/output column name.
    pub fn column_name(self) -> &'static str {
        match self {
            FiscalField::Deficit => "deficit_gdp",
            FiscalField::Receipts => "receipts_gdp",
            FiscalField::NonInterestSpend => "spend_nonint_gdp",
            FiscalField::InterestSpend => "spend_int_gdp",
            FiscalField::TotalSpend => "spend_tot_gdp",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FiscalField::Deficit => "deficits-to-GDP",
            FiscalField::Receipts => "receipts-to-GDP",
            FiscalField::NonInterestSpend => "noninterest spending-to-GDP",
            FiscalField::InterestSpend => "interest spending-to-GDP",
            FiscalField::TotalSpend => "total spending-to-GDP",
        }
    }
}

/// One year's fiscal variables. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FiscalValues {
    pub deficit_pct_gdp: Option<f64>,
    pub receipts_pct_gdp: Option<f64>,
    pub noninterest_spend_pct_gdp: Option<f64>,
    pub interest_spend_pct_gdp: Option<f64>,
    pub total_spend_pct_gdp: Option<f64>,
}

impl FiscalValues {
    pub fn get(&self, field: FiscalField) -> Option<f64> {
        match field {
            FiscalField::Deficit => self.deficit_pct_gdp,
            FiscalField::Receipts => self.receipts_pct_gdp,
            FiscalField::NonInterestSpend => self.noninterest_spend_pct_gdp,
            FiscalField::InterestSpend => self.interest_spend_pct_gdp,
            FiscalField::TotalSpend => self.total_spend_pct_gdp,
        }
    }

    pub fn set(&mut self, field: FiscalField, value: Option<f64>) {
        let slot = match field {
            FiscalField::Deficit => &mut self.deficit_pct_gdp,
            FiscalField::Receipts => &mut self.receipts_pct_gdp,
            FiscalField::NonInterestSpend => &mut self.noninterest_spend_pct_gdp,
            FiscalField::InterestSpend => &mut self.interest_spend_pct_gdp,
            FiscalField::TotalSpend => &mut self.total_spend_pct_gdp,
        };
        *slot = value;
    }

    /// `total - (interest + noninterest)`, when all three are present.
    ///
    /// Informational only; the loader logs large gaps but never rejects a row.
    pub fn spend_identity_gap(&self) -> Option<f64> {
        let total = self.total_spend_pct_gdp?;
        let int = self.interest_spend_pct_gdp?;
        let nonint = self.noninterest_spend_pct_gdp?;
        Some(total - (int + nonint))
    }
}

/// One row of the analysis dataset, keyed by calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalYearRecord {
    pub year: i32,
    pub president: Option<String>,
    pub president_party: Party,
    pub fiscal: FiscalValues,
    /// `None` when the dataset carries no Senate columns.
    pub senate: Option<ChamberSeats>,
    /// `None` when the dataset carries no House columns.
    pub house: Option<ChamberSeats>,
}

impl FiscalYearRecord {
    pub fn chamber(&self, chamber: Chamber) -> Option<&ChamberSeats> {
        match chamber {
            Chamber::Senate => self.senate.as_ref(),
            Chamber::House => self.house.as_ref(),
        }
    }

    pub fn value(&self, field: FiscalField) -> Option<f64> {
        self.fiscal.get(field)
    }
}

/// Which branches must align with a party for that party to be "in control".
///
/// The White House is always part of the definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ControlDefinition {
    /// White House + Senate + House.
    Full,
    /// White House + Senate.
    Senate,
    /// White House + House.
    House,
}

impl ControlDefinition {
    pub const ALL: [ControlDefinition; 3] = [
        ControlDefinition::Full,
        ControlDefinition::Senate,
        ControlDefinition::House,
    ];

    /// Chambers that must align with the president's party.
    pub fn chambers(self) -> &'static [Chamber] {
        match self {
            ControlDefinition::Full => &[Chamber::Senate, Chamber::House],
            ControlDefinition::Senate => &[Chamber::Senate],
            ControlDefinition::House => &[Chamber::House],
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ControlDefinition::Full => "Full control (White House + Senate + House)",
            ControlDefinition::Senate => "Senate control (White House + Senate)",
            ControlDefinition::House => "House control (White House + House)",
        }
    }

    /// Short column label for tables.
    pub fn short_name(self) -> &'static str {
        match self {
            ControlDefinition::Full => "WH+Sen+House",
            ControlDefinition::Senate => "WH+Sen",
            ControlDefinition::House => "WH+House",
        }
    }
}

/// Derived party-control label for one record under one definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ControlLabel {
    Republican,
    Democrat,
    Split,
}

impl ControlLabel {
    pub const ALL: [ControlLabel; 3] = [
        ControlLabel::Republican,
        ControlLabel::Democrat,
        ControlLabel::Split,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ControlLabel::Republican => "Republican control",
            ControlLabel::Democrat => "Democrat control",
            ControlLabel::Split => "Split control",
        }
    }
}

/// How a chamber majority is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MajorityRule {
    /// A party's seats strictly exceed half the chamber. Ties belong to neither party.
    Strict,
    /// A party's seats meet or exceed half the chamber.
    ///
    /// In an exact tie both parties hold a "majority"; the president's party
    /// then controls the chamber.
    AtLeastHalf,
    /// Use the recorded `dem_*_maj` flag; Republican majority is its negation.
    Recorded,
}

/// What to do when seat counts do not sum to the chamber total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityMode {
    /// Fail the record's classification.
    Strict,
    /// Classify anyway and report the fault alongside the label.
    Report,
}

/// What the partitioner does with a record whose classification fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnFault {
    /// Stop at the first fault.
    Abort,
    /// Leave the record out of every cohort and list it as skipped.
    Skip,
}

/// Inclusive `[start, end]` year bounds. Open ends default to the data's range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearWindow {
    pub fn new(start: Option<i32>, end: Option<i32>) -> Self {
        Self { start, end }
    }

    pub fn full() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(ValidationError::InvalidWindow { start, end }),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start.is_none_or(|s| year >= s) && self.end.is_none_or(|e| year <= e)
    }

    /// Narrow this window by another (intersection of bounds).
    ///
    /// `None` when the two windows share no year.
    pub fn intersect(&self, other: &YearWindow) -> Option<YearWindow> {
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let window = YearWindow { start, end };
        window.validate().ok().map(|()| window)
    }
}

impl fmt::Display for YearWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(s), Some(e)) => write!(f, "{s}-{e}"),
            (Some(s), None) => write!(f, "{s}-"),
            (None, Some(e)) => write!(f, "-{e}"),
            (None, None) => write!(f, "all years"),
        }
    }
}

impl FromStr for YearWindow {
    type Err = String;

    /// Parse `START:END`, `START:` or `:END`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid window '{s}'. Expected START:END (either side may be empty)."))?;
        let parse = |part: &str| -> Result<Option<i32>, String> {
            let part = part.trim();
            if part.is_empty() {
                return Ok(None);
            }
            part.parse::<i32>()
                .map(Some)
                .map_err(|_| format!("Invalid year '{part}' in window '{s}'."))
        };
        let window = YearWindow::new(parse(start)?, parse(end)?);
        window.validate().map_err(|e| e.to_string())?;
        Ok(window)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    /// Preamble lines before the CSV header.
    pub skip_rows: usize,
    /// Optional JSON file of load-time value overrides.
    pub adjustments_path: Option<PathBuf>,
    /// Global year bounds applied before partitioning.
    pub window: YearWindow,
    pub majority: MajorityRule,
    pub integrity: IntegrityMode,
    pub on_fault: OnFault,
}
