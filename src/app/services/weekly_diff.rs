//! Week-over-week comparison of discrepancy runs
//!
//! Runs are compared by account id only: an account is new when it appears
//! in this run but not in the previous snapshot, and resolved when it
//! appears in the snapshot but not in this run.

use crate::app::models::{AnalyzedRecord, SnapshotEntry};
use crate::constants::WEEK_STAMP_FORMAT;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::info;

/// New and resolved discrepancies between two runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyDiff {
    /// Current rows whose account id was not in the previous run
    pub new_discrepancies: Vec<AnalyzedRecord>,
    /// Previous entries whose account id is not in the current run
    pub resolved_discrepancies: Vec<SnapshotEntry>,
}

impl WeeklyDiff {
    /// Accounts appearing for the first time
    pub fn new_account_count(&self) -> usize {
        self.new_discrepancies
            .iter()
            .map(|r| r.record.account_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Accounts no longer present
    pub fn resolved_account_count(&self) -> usize {
        self.resolved_discrepancies
            .iter()
            .map(|e| e.account_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Compare the current run against the previous snapshot
///
/// Input order is preserved in both subsets.
pub fn diff_discrepancies(current: &[AnalyzedRecord], previous: &[SnapshotEntry]) -> WeeklyDiff {
    let previous_accounts: HashSet<&str> =
        previous.iter().map(|e| e.account_id.as_str()).collect();
    let current_accounts: HashSet<&str> = current
        .iter()
        .map(|r| r.record.account_id.as_str())
        .collect();

    let diff = WeeklyDiff {
        new_discrepancies: current
            .iter()
            .filter(|r| !previous_accounts.contains(r.record.account_id.as_str()))
            .cloned()
            .collect(),
        resolved_discrepancies: previous
            .iter()
            .filter(|e| !current_accounts.contains(e.account_id.as_str()))
            .cloned()
            .collect(),
    };

    info!(
        "Weekly diff: {} new rows ({} accounts), {} resolved entries ({} accounts)",
        diff.new_discrepancies.len(),
        diff.new_account_count(),
        diff.resolved_discrepancies.len(),
        diff.resolved_account_count()
    );
    diff
}

/// Snapshot entries for the next run's diff
pub fn snapshot_entries(records: &[AnalyzedRecord]) -> Vec<SnapshotEntry> {
    records.iter().map(AnalyzedRecord::to_snapshot).collect()
}

/// Week stamp stored with each run: Sunday-based week number, then year
///
/// Days before the year's first Sunday fall in week `00`.
pub fn week_stamp(date: NaiveDate) -> String {
    date.format(WEEK_STAMP_FORMAT).to_string()
}
