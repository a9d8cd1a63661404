//! Command implementations for the GLN reconciler CLI
//!
//! Each command lives in its own module:
//! - `analyze`: weekly reconciliation with storage and CSV exports
//! - `review`: listing and annotating stored discrepancies

pub mod analyze;
pub mod review;
pub mod shared;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Dispatch to the subcommand handler
pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Analyze(analyze_args)) => analyze::run_analyze(analyze_args).await,
        Some(Commands::Review(review_command)) => review::run_review(review_command).await,
        None => Err(Error::configuration("No command given")),
    }
}
