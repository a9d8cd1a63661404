//! Persistence of analyzed discrepancies
//!
//! The store keeps two tables:
//!
//! - `CURRENT_DISCREPANCIES` accumulates every analyzed row of every run,
//!   stamped with the run's week and carrying review notes and status
//! - `PREVIOUS_DISCREPANCIES` holds the snapshot of the latest run, replaced
//!   wholesale at the end of each run and used for the next week's diff
//!
//! Callers hold the store explicitly and pass it where it is needed; the
//! discrepancy engine never touches it.

pub mod sqlite;

pub use sqlite::SqliteDiscrepancyStore;

use crate::Result;
use crate::app::models::{AnalyzedRecord, ReviewStatus, SnapshotEntry, StoredDiscrepancy};

/// Persistence sink for analysis runs and review annotations
pub trait DiscrepancyStore {
    /// Create both tables if they do not exist
    fn ensure_schema(&mut self) -> Result<()>;

    /// Append analyzed rows to the current table with empty notes and status
    ///
    /// Returns the number of rows inserted.
    fn append_current(&mut self, records: &[AnalyzedRecord], date_record_pulled: &str)
    -> Result<usize>;

    /// All entries of the previous-run snapshot, in insertion order
    fn load_previous(&self) -> Result<Vec<SnapshotEntry>>;

    /// Replace the previous-run snapshot atomically
    fn replace_previous(&mut self, entries: &[SnapshotEntry]) -> Result<usize>;

    /// All rows of the current table, in insertion order
    fn load_current(&self) -> Result<Vec<StoredDiscrepancy>>;

    /// Set status, and notes when given, on every current row of an account
    ///
    /// Returns the number of rows updated; an account with no rows is an error.
    fn update_review(
        &mut self,
        account_id: &str,
        notes: Option<&str>,
        status: ReviewStatus,
    ) -> Result<usize>;
}
