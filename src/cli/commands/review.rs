//! Review command implementation
//!
//! `review list` prints stored discrepancies after search and filter;
//! `review update` records notes and a status against an account.

use crate::app::models::{ReviewStatus, StoredDiscrepancy};
use crate::app::services::csv_export::{stored_frame, write_csv};
use crate::app::services::discrepancy_store::SqliteDiscrepancyStore;
use crate::app::services::review::{ColumnFilter, ReviewQuery, list_discrepancies, update_review};
use crate::cli::args::{
    OutputFormat, ReviewCommand, ReviewListArgs, ReviewUpdateArgs, log_level_for,
};
use crate::cli::commands::shared::{ConfigOverrides, load_configuration, setup_logging};
use crate::config::Config;
use crate::{Error, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Dispatch a review subcommand
pub async fn run_review(command: ReviewCommand) -> Result<()> {
    match command {
        ReviewCommand::List(args) => run_list(args).await,
        ReviewCommand::Update(args) => run_update(args).await,
    }
}

async fn run_list(args: ReviewListArgs) -> Result<()> {
    setup_logging(log_level_for(args.verbose, false), false)?;

    let query = build_query(args.search.as_deref(), args.filter.as_deref())?;
    let config = review_configuration(args.config_file.as_deref(), args.database_path.clone())?;

    let rows = tokio::task::spawn_blocking(move || list_from(&config, &query))
        .await
        .map_err(|e| Error::processing_interrupted(format!("Review task failed: {}", e)))??;

    match args.output_format {
        OutputFormat::Human => print_human_listing(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => {
            let mut df = stored_frame(&rows)?;
            write_csv(std::io::stdout().lock(), &mut df)?;
        }
    }
    Ok(())
}

async fn run_update(args: ReviewUpdateArgs) -> Result<()> {
    setup_logging(log_level_for(args.verbose, false), false)?;

    let status: ReviewStatus = args.status.parse()?;
    let config = review_configuration(args.config_file.as_deref(), args.database_path.clone())?;
    let account_id = args.account_id.clone();
    let notes = args.notes.clone();

    let updated = tokio::task::spawn_blocking(move || {
        update_in(&config, &account_id, notes.as_deref(), status)
    })
    .await
    .map_err(|e| Error::processing_interrupted(format!("Review task failed: {}", e)))??;

    println!(
        "Updated {} rows for account {} to {}",
        updated,
        args.account_id.trim().bold(),
        status.to_string().cyan()
    );
    Ok(())
}

/// Build a review query from raw command-line values
pub fn build_query(search: Option<&str>, filter: Option<&str>) -> Result<ReviewQuery> {
    let mut query = ReviewQuery::default();
    if let Some(term) = search {
        query = query.with_search(term);
    }
    if let Some(raw) = filter {
        query = query.with_filter(raw.parse::<ColumnFilter>()?);
    }
    Ok(query)
}

fn review_configuration(
    config_file: Option<&Path>,
    database_path: Option<PathBuf>,
) -> Result<Config> {
    load_configuration(
        config_file,
        &ConfigOverrides {
            database_path,
            ..ConfigOverrides::default()
        },
    )
}

/// List stored rows from the configured database
pub fn list_from(config: &Config, query: &ReviewQuery) -> Result<Vec<StoredDiscrepancy>> {
    let store = SqliteDiscrepancyStore::open(&config.storage.database_path)?;
    let rows = list_discrepancies(&store, query)?;
    info!("Listing {} stored discrepancies", rows.len());
    Ok(rows)
}

/// Update an account in the configured database
pub fn update_in(
    config: &Config,
    account_id: &str,
    notes: Option<&str>,
    status: ReviewStatus,
) -> Result<usize> {
    let mut store = SqliteDiscrepancyStore::open(&config.storage.database_path)?;
    update_review(&mut store, account_id, notes, status)
}

fn print_human_listing(rows: &[StoredDiscrepancy]) {
    if rows.is_empty() {
        println!("No stored discrepancies match");
        return;
    }

    for row in rows {
        let label = if row.discrepancy.is_empty() {
            "none".dimmed().to_string()
        } else {
            row.discrepancy.yellow().to_string()
        };
        println!(
            "{} {} GLN {} [{}]",
            row.record.account_id.bold(),
            row.date_record_pulled,
            row.record.gln,
            label
        );
        println!("    {}", row.normalized_address);
        if let Some(status) = row.status {
            println!("    status: {}", status.as_str().cyan());
        }
        if let Some(notes) = &row.notes {
            println!("    notes: {}", notes);
        }
    }
    println!("\n{} rows", rows.len());
}
