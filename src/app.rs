//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and parses CLI arguments
//! - sets up diagnostics
//! - loads and adjusts the dataset
//! - runs the requested classification/statistics
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::warn;

use crate::cli::{ClassifyArgs, Cli, Command, GlobalArgs, RegressArgs, SummaryArgs, TtestArgs};
use crate::domain::{AnalysisConfig, ControlDefinition, YearWindow};
use crate::error::AppError;
use crate::report;

pub mod pipeline;

/// Entry point for the `fiscal` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal; only the process environment is used then.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    crate::logging::init_logging(cli.global.verbose, cli.global.log_json);

    let config = analysis_config_from_args(&cli.global)?;
    match cli.command {
        Command::Classify(args) => handle_classify(&config, &args),
        Command::Summary(args) => handle_summary(&config, &args),
        Command::Ttest(args) => handle_ttest(&config, &args),
        Command::Regress(args) => handle_regress(&config, &args),
    }
}

fn handle_classify(config: &AnalysisConfig, args: &ClassifyArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(config)?;
    let partition = pipeline::partition(&dataset, config, args.control, &YearWindow::full())?;

    println!(
        "{}",
        report::format_run_header(&dataset.ingest, &dataset.adjustments, config)
    );
    println!("{}", report::format_classification(&partition));

    if let Some(path) = &args.export {
        crate::io::export::write_classification_csv(path, &partition)?;
    }

    Ok(())
}

fn handle_summary(config: &AnalysisConfig, args: &SummaryArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(config)?;
    let partitions = pipeline::partition_grid(&dataset, config, &ControlDefinition::ALL, &args.windows)?;

    if let Some(empty) = partitions.iter().find(|p| p.is_empty()) {
        warn!(window = %empty.window, "window contains no classified years");
    }

    let table = report::build_summary_table(&partitions, &args.fields);

    println!(
        "{}",
        report::format_run_header(&dataset.ingest, &dataset.adjustments, config)
    );
    println!("{}", report::format_summary_table(&table));

    if let Some(path) = &args.export_json {
        crate::io::export::write_summary_json(path, &table)?;
    }

    Ok(())
}

fn handle_ttest(config: &AnalysisConfig, args: &TtestArgs) -> Result<(), AppError> {
    if args.cohort == args.against {
        return Err(AppError::new(2, "--cohort and --against must name different cohorts."));
    }

    let dataset = pipeline::load_dataset(config)?;
    let partition = pipeline::partition(&dataset, config, args.control, &YearWindow::full())?;
    let comparison = report::compare_cohorts(&partition, args.field, args.cohort, args.against);

    println!(
        "{}",
        report::format_run_header(&dataset.ingest, &dataset.adjustments, config)
    );
    println!("{}", report::format_comparison(&comparison));

    if comparison.test.is_none() {
        return Err(AppError::new(
            4,
            format!(
                "One-sided test undefined for {} (n={}) vs {} (n={}).",
                args.cohort.display_name(),
                comparison.cohort_summary.count,
                args.against.display_name(),
                comparison.against_summary.count,
            ),
        ));
    }

    Ok(())
}

fn handle_regress(config: &AnalysisConfig, args: &RegressArgs) -> Result<(), AppError> {
    let dataset = pipeline::load_dataset(config)?;
    let partition = pipeline::partition(&dataset, config, args.control, &YearWindow::full())?;
    let rows = report::regress_on_seat_share(&partition, args.field, args.chamber);

    println!(
        "{}",
        report::format_run_header(&dataset.ingest, &dataset.adjustments, config)
    );
    println!(
        "{}",
        report::format_regression(&partition, args.field, args.chamber, &rows)
    );

    Ok(())
}

/// Collect the shared flags into an `AnalysisConfig`.
pub fn analysis_config_from_args(args: &GlobalArgs) -> Result<AnalysisConfig, AppError> {
    let data_path = args.data.clone().ok_or_else(|| {
        AppError::new(
            2,
            "No dataset given: pass --data <CSV> or set FISCAL_DATA (a .env file works too).",
        )
    })?;

    let window = YearWindow::new(args.start, args.end);
    window.validate()?;

    Ok(AnalysisConfig {
        data_path,
        skip_rows: args.skip_rows,
        adjustments_path: args.adjust.clone(),
        window,
        majority: args.majority,
        integrity: args.integrity,
        on_fault: args.on_fault,
    })
}
