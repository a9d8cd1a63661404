//! Review operations over stored discrepancies
//!
//! Reviewers list the current table, narrow it with a free-text search and
//! an exact column filter, and annotate accounts with notes and a status.

use crate::app::models::{ReviewStatus, StoredDiscrepancy};
use crate::app::services::discrepancy_store::DiscrepancyStore;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Exact-match filter on one stored column, written `COLUMN=VALUE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    column: &'static str,
    value: String,
}

impl ColumnFilter {
    /// Create a filter, resolving the column name case-insensitively
    pub fn new(column: &str, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let resolved = StoredDiscrepancy::column_names()
            .find(|name| name.eq_ignore_ascii_case(column.trim()))
            .ok_or_else(|| {
                Error::invalid_filter(
                    format!("{}={}", column, value),
                    format!("unknown column '{}'", column.trim()),
                )
            })?;
        Ok(Self {
            column: resolved,
            value,
        })
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the row's value in the filtered column equals the filter value
    ///
    /// Absent values match an empty filter value.
    pub fn matches(&self, row: &StoredDiscrepancy) -> bool {
        row.column_value(self.column).unwrap_or("") == self.value
    }
}

impl FromStr for ColumnFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (column, value) = s
            .split_once('=')
            .ok_or_else(|| Error::invalid_filter(s, "expected COLUMN=VALUE"))?;
        Self::new(column, value)
    }
}

impl fmt::Display for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column, self.value)
    }
}

/// Whether any column of the row contains `term`, ignoring case
pub fn row_contains(row: &StoredDiscrepancy, term: &str) -> bool {
    let needle = term.to_lowercase();
    StoredDiscrepancy::column_names()
        .filter_map(|column| row.column_value(column))
        .any(|value| value.to_lowercase().contains(&needle))
}

/// Rows containing `term` in any column
pub fn search<'a>(rows: &'a [StoredDiscrepancy], term: &str) -> Vec<&'a StoredDiscrepancy> {
    rows.iter().filter(|row| row_contains(row, term)).collect()
}

/// Rows passing an exact column filter
pub fn apply_filter<'a>(
    rows: &'a [StoredDiscrepancy],
    filter: &ColumnFilter,
) -> Vec<&'a StoredDiscrepancy> {
    rows.iter().filter(|row| filter.matches(row)).collect()
}

/// Combined search and filter criteria for listing
#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    pub search: Option<String>,
    pub filter: Option<ColumnFilter>,
}

impl ReviewQuery {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_filter(mut self, filter: ColumnFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Whether a row satisfies every criterion
    pub fn matches(&self, row: &StoredDiscrepancy) -> bool {
        let searched = self
            .search
            .as_deref()
            .filter(|term| !term.is_empty())
            .is_none_or(|term| row_contains(row, term));
        let filtered = self.filter.as_ref().is_none_or(|f| f.matches(row));
        searched && filtered
    }
}

/// Load the current table and keep the rows matching `query`
pub fn list_discrepancies(
    store: &dyn DiscrepancyStore,
    query: &ReviewQuery,
) -> Result<Vec<StoredDiscrepancy>> {
    let rows = store.load_current()?;
    let total = rows.len();
    let selected: Vec<StoredDiscrepancy> = rows.into_iter().filter(|row| query.matches(row)).collect();
    debug!("Review listing: {} of {} stored rows", selected.len(), total);
    Ok(selected)
}

/// Annotate every stored row of an account
///
/// # Arguments
///
/// * `store` - Discrepancy store to update
/// * `account_id` - Account whose rows are updated
/// * `notes` - New notes; `None` keeps the existing notes
/// * `status` - New review status
pub fn update_review(
    store: &mut dyn DiscrepancyStore,
    account_id: &str,
    notes: Option<&str>,
    status: ReviewStatus,
) -> Result<usize> {
    let account_id = account_id.trim();
    if account_id.is_empty() {
        return Err(Error::review_target_not_found(account_id));
    }
    store.update_review(account_id, notes, status)
}
