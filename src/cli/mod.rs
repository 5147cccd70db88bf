//! Command-line parsing for the party-control deficit analysis.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the classification/statistics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    Chamber, ControlDefinition, ControlLabel, FiscalField, IntegrityMode, MajorityRule, OnFault, YearWindow,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fiscal", version, about = "Deficits and spending by party control of government")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Party-control dataset CSV.
    #[arg(long, global = true, env = "FISCAL_DATA", value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Title/preamble lines before the CSV header.
    #[arg(long, global = true, default_value_t = 0)]
    pub skip_rows: usize,

    /// JSON file of per-year value overrides applied after loading.
    #[arg(long, global = true, value_name = "JSON")]
    pub adjust: Option<PathBuf>,

    /// First year to include (inclusive).
    #[arg(long, global = true)]
    pub start: Option<i32>,

    /// Last year to include (inclusive).
    #[arg(long, global = true)]
    pub end: Option<i32>,

    /// How a chamber majority is decided.
    #[arg(long, global = true, value_enum, default_value_t = MajorityRule::Strict)]
    pub majority: MajorityRule,

    /// Seat counts that do not sum to the chamber total: fail, or report and continue.
    #[arg(long, global = true, value_enum, default_value_t = IntegrityMode::Strict)]
    pub integrity: IntegrityMode,

    /// A year that cannot be classified: abort the run, or skip the year.
    #[arg(long, global = true, value_enum, default_value_t = OnFault::Abort)]
    pub on_fault: OnFault,

    /// Debug-level diagnostics on stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit diagnostics as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List each year with its party-control label.
    Classify(ClassifyArgs),
    /// Mean, sample std, and count per cohort for each control definition.
    Summary(SummaryArgs),
    /// One-sided comparison of two cohorts' means.
    Ttest(TtestArgs),
    /// Regress a fiscal variable on a chamber's Democrat seat share.
    Regress(RegressArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ClassifyArgs {
    /// Which branches must align for party control.
    #[arg(long, value_enum, default_value_t = ControlDefinition::Full)]
    pub control: ControlDefinition,

    /// Export the classified years to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    /// Fiscal variables to summarize.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = FiscalField::ALL)]
    pub fields: Vec<FiscalField>,

    /// Year windows as START:END (repeatable; narrowed by --start/--end).
    #[arg(long = "window", value_name = "START:END")]
    pub windows: Vec<YearWindow>,

    /// Export the summary table to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TtestArgs {
    #[arg(long, value_enum, default_value_t = FiscalField::Deficit)]
    pub field: FiscalField,

    #[arg(long, value_enum, default_value_t = ControlDefinition::Full)]
    pub control: ControlDefinition,

    /// Cohort whose standard deviation scales the statistic.
    #[arg(long, value_enum, default_value_t = ControlLabel::Republican)]
    pub cohort: ControlLabel,

    /// Cohort compared against.
    #[arg(long, value_enum, default_value_t = ControlLabel::Democrat)]
    pub against: ControlLabel,
}

#[derive(Debug, Args, Clone)]
pub struct RegressArgs {
    #[arg(long, value_enum, default_value_t = FiscalField::Deficit)]
    pub field: FiscalField,

    /// Chamber whose Democrat seat share is the regressor.
    #[arg(long, value_enum)]
    pub chamber: Chamber,

    /// Control definition used to form the per-cohort rows.
    #[arg(long, value_enum, default_value_t = ControlDefinition::Full)]
    pub control: ControlDefinition,
}
