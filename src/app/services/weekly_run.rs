//! One weekly reconciliation run
//!
//! Wires the collaborators around the discrepancy engine:
//!
//! 1. Load records from the source (optionally reduced to mismatch candidates)
//! 2. Analyze them with the engine
//! 3. Append the analyzed rows to the current table with this week's stamp
//! 4. Diff against the previous snapshot
//! 5. Export the analyzed, new and resolved files
//! 6. Replace the previous snapshot with this run
//!
//! A dry run performs steps 1, 2 and 4 only.

use crate::Result;
use crate::app::services::candidate_selection::select_candidates;
use crate::app::services::csv_export::CsvExporter;
use crate::app::services::discrepancy_engine::{DiscrepancyEngine, EngineStats};
use crate::app::services::discrepancy_store::DiscrepancyStore;
use crate::app::services::record_source::RecordSource;
use crate::app::services::weekly_diff::{diff_discrepancies, snapshot_entries, week_stamp};
use chrono::NaiveDate;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Switches for a run
#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyRunOptions {
    /// Reduce the extract to mismatch candidates before analysis
    pub select_candidates: bool,
    /// Analyze and diff without writing to the store or exporting
    pub dry_run: bool,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyRunReport {
    pub source: String,
    pub week: String,
    pub input_records: usize,
    pub analyzed_records: usize,
    pub engine: EngineStats,
    pub stored_rows: usize,
    pub new_discrepancies: usize,
    pub new_accounts: usize,
    pub resolved_discrepancies: usize,
    pub resolved_accounts: usize,
    pub exported_files: Vec<PathBuf>,
    pub dry_run: bool,
}

/// A reconciliation run over explicit collaborators
pub struct WeeklyRun<'a> {
    source: &'a dyn RecordSource,
    store: &'a mut dyn DiscrepancyStore,
    exporter: Option<&'a CsvExporter>,
    engine: DiscrepancyEngine,
    options: WeeklyRunOptions,
}

impl<'a> WeeklyRun<'a> {
    pub fn new(
        source: &'a dyn RecordSource,
        store: &'a mut dyn DiscrepancyStore,
        engine: DiscrepancyEngine,
    ) -> Self {
        Self {
            source,
            store,
            exporter: None,
            engine,
            options: WeeklyRunOptions::default(),
        }
    }

    /// Export files through `exporter` after persisting
    pub fn with_exporter(mut self, exporter: &'a CsvExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn with_options(mut self, options: WeeklyRunOptions) -> Self {
        self.options = options;
        self
    }

    /// Execute the run
    ///
    /// # Arguments
    ///
    /// * `today` - Date used for the week stamp of stored rows
    /// * `progress_bar` - Optional progress bar for the similarity pass
    ///
    /// # Returns
    ///
    /// A `WeeklyRunReport` describing what was analyzed, stored and exported
    pub fn execute(
        self,
        today: NaiveDate,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<WeeklyRunReport> {
        let week = week_stamp(today);
        let source = self.source.describe();
        info!("Starting run for week {} from {}", week, source);

        let mut records = self.source.fetch_records()?;
        let input_records = records.len();
        if self.options.select_candidates {
            records = select_candidates(records);
        }

        let result = self.engine.process_with_progress(records, progress_bar)?;

        self.store.ensure_schema()?;
        let previous = self.store.load_previous()?;

        let stored_rows = if self.options.dry_run {
            0
        } else {
            self.store.append_current(&result.records, &week)?
        };

        let diff = diff_discrepancies(&result.records, &previous);

        let mut exported_files = Vec::new();
        if !self.options.dry_run {
            if let Some(exporter) = self.exporter {
                exported_files = exporter.export_all(&result.records, &diff)?;
            }
            self.store
                .replace_previous(&snapshot_entries(&result.records))?;
        } else {
            info!("Dry run: store and exports left untouched");
        }

        Ok(WeeklyRunReport {
            source,
            week,
            input_records,
            analyzed_records: result.records.len(),
            new_discrepancies: diff.new_discrepancies.len(),
            new_accounts: diff.new_account_count(),
            resolved_discrepancies: diff.resolved_discrepancies.len(),
            resolved_accounts: diff.resolved_account_count(),
            engine: result.stats,
            stored_rows,
            exported_files,
            dry_run: self.options.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::AddressRecord;
    use crate::app::services::discrepancy_store::SqliteDiscrepancyStore;
    use crate::app::services::record_source::InMemoryRecordSource;
    use crate::config::OutputConfig;
    use tempfile::TempDir;

    fn week_seven() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()
    }

    fn source(rows: &[(&str, &str, &str)]) -> InMemoryRecordSource {
        InMemoryRecordSource::new(
            rows.iter()
                .map(|(account, gln, address)| AddressRecord::new(*account, *gln, *address))
                .collect(),
        )
    }

    #[test]
    fn test_two_runs_track_new_and_resolved() {
        let mut store = SqliteDiscrepancyStore::open_in_memory().unwrap();

        let first = source(&[("1", "A", "123 Main St"), ("2", "B", "123 Main Street")]);
        let report = WeeklyRun::new(&first, &mut store, DiscrepancyEngine::default())
            .execute(week_seven(), None)
            .unwrap();
        assert_eq!(report.week, "07-2024");
        assert_eq!(report.stored_rows, 2);
        assert_eq!(report.new_accounts, 2);
        assert_eq!(report.resolved_accounts, 0);

        let second = source(&[("2", "B", "123 Main Street"), ("3", "C", "9 Oak Ave")]);
        let report = WeeklyRun::new(&second, &mut store, DiscrepancyEngine::default())
            .execute(week_seven(), None)
            .unwrap();
        assert_eq!(report.new_accounts, 1);
        assert_eq!(report.resolved_accounts, 1);

        assert_eq!(store.current_row_count().unwrap(), 4);
        let snapshot: Vec<String> = store
            .load_previous()
            .unwrap()
            .into_iter()
            .map(|e| e.account_id)
            .collect();
        assert_eq!(snapshot, vec!["2", "3"]);
    }

    #[test]
    fn test_dry_run_leaves_store_untouched() {
        let mut store = SqliteDiscrepancyStore::open_in_memory().unwrap();
        let records = source(&[("1", "A", "1 Elm St")]);

        let report = WeeklyRun::new(&records, &mut store, DiscrepancyEngine::default())
            .with_options(WeeklyRunOptions {
                dry_run: true,
                ..WeeklyRunOptions::default()
            })
            .execute(week_seven(), None)
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.new_accounts, 1);
        assert_eq!(store.current_row_count().unwrap(), 0);
        assert!(store.load_previous().unwrap().is_empty());
    }

    #[test]
    fn test_exports_written_when_exporter_given() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(&OutputConfig {
            output_dir: dir.path().to_path_buf(),
            ..OutputConfig::default()
        });
        let mut store = SqliteDiscrepancyStore::open_in_memory().unwrap();
        let records = source(&[("1", "A", "1 Elm St")]);

        let report = WeeklyRun::new(&records, &mut store, DiscrepancyEngine::default())
            .with_exporter(&exporter)
            .execute(week_seven(), None)
            .unwrap();

        assert_eq!(report.exported_files.len(), 3);
        assert!(dir.path().join("new_discrepancies.csv").exists());
    }

    #[test]
    fn test_candidate_selection_reduces_input() {
        let mut store = SqliteDiscrepancyStore::open_in_memory().unwrap();
        let mut rows = vec![
            AddressRecord::new("1", "G1", "1 Elm St")
                .with_group_name("NE")
                .with_location_id("L1"),
            AddressRecord::new("2", "G2", "1 Elm Street")
                .with_group_name("NE")
                .with_location_id("L1"),
        ];
        rows.push(AddressRecord::new("3", "G3", "5 Oak Ave"));
        let records = InMemoryRecordSource::new(rows);

        let report = WeeklyRun::new(&records, &mut store, DiscrepancyEngine::default())
            .with_options(WeeklyRunOptions {
                select_candidates: true,
                dry_run: false,
            })
            .execute(week_seven(), None)
            .unwrap();

        assert_eq!(report.input_records, 3);
        assert_eq!(report.analyzed_records, 2);
    }
}
