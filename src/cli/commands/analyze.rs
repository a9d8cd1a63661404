//! Analyze command implementation
//!
//! Runs one weekly reconciliation: load the extract, flag discrepancies,
//! store the run, diff against last week and export the result files.

use crate::app::services::csv_export::CsvExporter;
use crate::app::services::discrepancy_engine::{DiscrepancyEngine, EngineStats};
use crate::app::services::discrepancy_store::SqliteDiscrepancyStore;
use crate::app::services::record_source::CsvRecordSource;
use crate::app::services::weekly_run::{WeeklyRun, WeeklyRunOptions, WeeklyRunReport};
use crate::cli::args::{AnalyzeArgs, OutputFormat};
use crate::cli::commands::shared::{
    ConfigOverrides, create_progress_bar, load_configuration, setup_logging,
};
use crate::config::Config;
use crate::{Error, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use indicatif::HumanDuration;
use std::time::{Duration, Instant};
use tracing::info;

/// Run the analyze command
pub async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    info!("Starting GLN reconciliation");

    args.validate()?;

    let overrides = ConfigOverrides {
        threshold: args.threshold,
        propagation_mode: args.propagation_mode(),
        database_path: args.database_path.clone(),
        output_dir: args.output_path.clone(),
    };
    let config = load_configuration(args.config_file.as_deref(), &overrides)?;

    let options = WeeklyRunOptions {
        select_candidates: args.select_candidates,
        dry_run: args.dry_run,
    };
    let show_progress = args.show_progress();
    let input_path = args.input_path.clone();
    let today = Local::now().date_naive();

    // Polars and SQLite are blocking; keep them off the async runtime
    let report = tokio::task::spawn_blocking(move || {
        execute_run(&config, input_path, options, today, show_progress)
    })
    .await
    .map_err(|e| Error::processing_interrupted(format!("Analysis task failed: {}", e)))??;

    match args.output_format {
        OutputFormat::Json => print_json_report(&report)?,
        _ if args.quiet => {}
        _ => print_human_report(&report, start_time.elapsed()),
    }

    Ok(())
}

/// Build the collaborators from configuration and execute one run
pub fn execute_run(
    config: &Config,
    input_path: std::path::PathBuf,
    options: WeeklyRunOptions,
    today: NaiveDate,
    show_progress: bool,
) -> Result<WeeklyRunReport> {
    let source = CsvRecordSource::new(input_path);
    let mut store = SqliteDiscrepancyStore::open(&config.storage.database_path)?;
    let exporter = CsvExporter::new(&config.output);
    let engine = DiscrepancyEngine::new(&config.matching);

    let progress_bar = show_progress.then(|| create_progress_bar("Comparing addresses"));

    let report = WeeklyRun::new(&source, &mut store, engine)
        .with_exporter(&exporter)
        .with_options(options)
        .execute(today, progress_bar.as_ref())?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(report)
}

fn print_human_report(report: &WeeklyRunReport, elapsed: Duration) {
    let engine = &report.engine;

    println!("\n{}", "GLN Reconciliation Complete".bold().green());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Week {} from {}", report.week.bold(), report.source);
    println!("   • Records loaded: {}", report.input_records);
    println!("   • Records analyzed: {}", report.analyzed_records);
    println!("   • Distinct addresses: {}", engine.distinct_addresses);
    println!("   • Distinct GLNs: {}", engine.distinct_glns);
    println!("   • {}", flagged_summary(engine).yellow());
    for (label, count) in &engine.label_counts {
        println!("       {} × {}", count, label);
    }
    println!(
        "   • Similar address pairs: {} ({} labels propagated in {} passes)",
        engine.similar_pairs, engine.labels_propagated, engine.propagation_passes
    );

    println!("\nWeek over week:");
    println!(
        "   • New: {} rows across {} accounts",
        report.new_discrepancies.to_string().red(),
        report.new_accounts
    );
    println!(
        "   • Resolved: {} entries across {} accounts",
        report.resolved_discrepancies.to_string().green(),
        report.resolved_accounts
    );

    if report.dry_run {
        println!("\n{}", "Dry run: nothing stored or exported".cyan());
    } else {
        println!("\nStored {} rows", report.stored_rows);
        if !report.exported_files.is_empty() {
            println!("Output files:");
            for path in &report.exported_files {
                println!("   • {}", path.display());
            }
        }
    }

    println!("Processing time: {}\n", HumanDuration(elapsed));
}

/// Flagged row count with its share of the input
fn flagged_summary(engine: &EngineStats) -> String {
    format!(
        "Flagged rows: {} ({:.1}%)",
        engine.flagged_rows,
        engine.flagged_rate()
    )
}

fn print_json_report(report: &WeeklyRunReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
