//! Command-line argument definitions for the GLN reconciler
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::PropagationMode;
use crate::constants::MAX_SIMILARITY_SCORE;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the GLN reconciler
///
/// Compares shipping-location identifiers against account delivery addresses,
/// flags mismatches, and tracks them week over week for review.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gln-recon",
    version,
    about = "Reconcile SHIP_TO_GLN identifiers against account delivery addresses",
    long_about = "Loads an account extract, canonicalizes delivery addresses, flags GLNs with \
                  several addresses and addresses shared by several GLNs (including near-duplicate \
                  addresses), stores each weekly run, and reports new and resolved discrepancies."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the weekly reconciliation over an account extract
    Analyze(AnalyzeArgs),
    /// List and annotate stored discrepancies
    #[command(subcommand)]
    Review(ReviewCommand),
}

/// Arguments for the analyze command
#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    /// Account extract in CSV format
    ///
    /// Must carry at least SHIP_TO_GLN, CUST_ACCT_ID and ACCT_DLVRY_ADDR.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Account extract CSV file"
    )]
    pub input_path: PathBuf,

    /// Directory for the exported CSV files
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Directory for exported CSV files"
    )]
    pub output_path: Option<PathBuf>,

    /// SQLite database holding current and previous discrepancies
    #[arg(long = "database", value_name = "FILE", help = "Discrepancy database file")]
    pub database_path: Option<PathBuf>,

    /// Configuration file path
    ///
    /// Defaults to the user configuration directory when present.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config_file: Option<PathBuf>,

    /// Similarity threshold (0-100) for treating two addresses as the same place
    #[arg(
        short = 't',
        long = "threshold",
        value_name = "SCORE",
        help = "Similarity threshold between 0 and 100"
    )]
    pub threshold: Option<u8>,

    /// Repeat label propagation until no label changes
    ///
    /// Without this flag a single ordered pass is made, so labels do not
    /// travel along chains of similar addresses.
    #[arg(long = "closure", help = "Propagate labels until nothing changes")]
    pub closure: bool,

    /// Reduce the extract to accounts sharing a group and location with another GLN
    #[arg(
        long = "select-candidates",
        help = "Analyze only mismatch candidates from the extract"
    )]
    pub select_candidates: bool,

    /// Analyze and diff without writing the database or exports
    #[arg(long = "dry-run", help = "Analyze without storing or exporting")]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the run report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the run report"
    )]
    pub output_format: OutputFormat,
}

/// Review subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ReviewCommand {
    /// List stored discrepancies, optionally searched and filtered
    List(ReviewListArgs),
    /// Set notes and status on every stored row of an account
    Update(ReviewUpdateArgs),
}

/// Arguments for `review list`
#[derive(Debug, Clone, Parser)]
pub struct ReviewListArgs {
    /// Case-insensitive text searched across every column
    #[arg(short = 's', long = "search", value_name = "TEXT", help = "Free-text search")]
    pub search: Option<String>,

    /// Exact match on one column, written COLUMN=VALUE
    #[arg(
        short = 'f',
        long = "filter",
        value_name = "COLUMN=VALUE",
        help = "Exact column filter"
    )]
    pub filter: Option<String>,

    #[arg(long = "database", value_name = "FILE", help = "Discrepancy database file")]
    pub database_path: Option<PathBuf>,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the listing"
    )]
    pub output_format: OutputFormat,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Arguments for `review update`
#[derive(Debug, Clone, Parser)]
pub struct ReviewUpdateArgs {
    /// Account whose stored rows are updated
    #[arg(short = 'a', long = "account", value_name = "ID", help = "CUST_ACCT_ID to update")]
    pub account_id: String,

    /// Review status: Open, In Progress, Resolved or Closed
    #[arg(long = "status", value_name = "STATUS", help = "Open, In Progress, Resolved or Closed")]
    pub status: String,

    /// Notes to record; existing notes are kept when omitted
    #[arg(short = 'n', long = "notes", value_name = "TEXT", help = "Reviewer notes")]
    pub notes: Option<String>,

    #[arg(long = "database", value_name = "FILE", help = "Discrepancy database file")]
    pub database_path: Option<PathBuf>,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
    /// CSV format for spreadsheets
    Csv,
}

/// Map a `-v` count to a tracing level
pub fn log_level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl AnalyzeArgs {
    /// Validate argument consistency before any work starts
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.exists() {
            return Err(Error::configuration(format!(
                "Input file does not exist: {}",
                self.input_path.display()
            )));
        }

        if let Some(threshold) = self.threshold {
            if threshold > MAX_SIMILARITY_SCORE {
                return Err(Error::configuration(format!(
                    "Threshold must be at most {}, got {}",
                    MAX_SIMILARITY_SCORE, threshold
                )));
            }
        }

        if self.output_format == OutputFormat::Csv {
            return Err(Error::configuration(
                "CSV output is only available for review listings",
            ));
        }

        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.verbose, self.quiet)
    }

    /// Propagation mode requested on the command line, if any
    pub fn propagation_mode(&self) -> Option<PropagationMode> {
        self.closure.then_some(PropagationMode::Closure)
    }

    /// Check if we should show progress bars
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}
