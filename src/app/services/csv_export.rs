//! CSV exports of an analysis run
//!
//! Three files are written into the output directory:
//!
//! - analyzed data: every input column plus `Normalized_Address` and `Discrepancy`
//! - new discrepancies: the same columns with `Unique_Addresses_for_GLN` before
//!   `Discrepancy`, restricted to accounts new this week
//! - resolved discrepancies: the snapshot columns of accounts gone this week

use crate::app::models::{AnalyzedRecord, SnapshotEntry, StoredDiscrepancy};
use crate::app::services::weekly_diff::WeeklyDiff;
use crate::config::OutputConfig;
use crate::constants::columns;
use crate::{Error, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build the frame of analyzed records
///
/// # Arguments
///
/// * `records` - Analyzed records, written in order
/// * `include_unique_count` - Whether to include `Unique_Addresses_for_GLN`
pub fn analyzed_frame(records: &[AnalyzedRecord], include_unique_count: bool) -> Result<DataFrame> {
    let mut frame_columns: Vec<Column> = columns::INPUT_COLUMNS
        .iter()
        .map(|&name| {
            let values: Vec<Option<&str>> =
                records.iter().map(|r| r.record.column_value(name)).collect();
            Column::new(name.into(), values)
        })
        .collect();

    let normalized: Vec<&str> = records
        .iter()
        .map(|r| r.normalized_address.as_str())
        .collect();
    frame_columns.push(Column::new(columns::NORMALIZED_ADDRESS.into(), normalized));

    if include_unique_count {
        let counts: Vec<u64> = records
            .iter()
            .map(|r| r.unique_addresses_for_gln as u64)
            .collect();
        frame_columns.push(Column::new(columns::UNIQUE_ADDRESSES_FOR_GLN.into(), counts));
    }

    let labels: Vec<&str> = records.iter().map(|r| r.discrepancy.as_str()).collect();
    frame_columns.push(Column::new(columns::DISCREPANCY.into(), labels));

    Ok(DataFrame::new(frame_columns)?)
}

fn snapshot_column<'a>(
    entries: &'a [SnapshotEntry],
    name: &str,
    value: fn(&'a SnapshotEntry) -> Option<&'a str>,
) -> Column {
    let values: Vec<Option<&str>> = entries.iter().map(value).collect();
    Column::new(name.into(), values)
}

/// Build the frame of snapshot entries
pub fn snapshot_frame(entries: &[SnapshotEntry]) -> Result<DataFrame> {
    let frame_columns = vec![
        snapshot_column(entries, columns::CUST_ACCT_ID, |e| Some(e.account_id.as_str())),
        snapshot_column(entries, columns::STORED_NORMALIZED_ADDRESS, |e| {
            Some(e.normalized_address.as_str())
        }),
        snapshot_column(entries, columns::INA_LOC_ID, |e| e.location_id.as_deref()),
        snapshot_column(entries, columns::SHIP_TO_GLN, |e| Some(e.gln.as_str())),
        snapshot_column(entries, columns::STORED_DISCREPANCY, |e| {
            Some(e.discrepancy.as_str())
        }),
    ];

    Ok(DataFrame::new(frame_columns)?)
}

/// Build the frame of stored discrepancies, in table column order
pub fn stored_frame(rows: &[StoredDiscrepancy]) -> Result<DataFrame> {
    let frame_columns: Vec<Column> = StoredDiscrepancy::column_names()
        .map(|name| {
            let values: Vec<Option<&str>> = rows.iter().map(|r| r.column_value(name)).collect();
            Column::new(name.into(), values)
        })
        .collect();

    Ok(DataFrame::new(frame_columns)?)
}

/// Write a frame as CSV with a header to any writer
pub fn write_csv<W: Write>(writer: W, df: &mut DataFrame) -> Result<()> {
    CsvWriter::new(writer).include_header(true).finish(df)?;
    Ok(())
}

/// Writes the export files of a run
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output: OutputConfig,
}

impl CsvExporter {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            output: output.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output.output_dir
    }

    /// Write every analyzed record, without the per-GLN count
    pub fn write_analyzed(&self, records: &[AnalyzedRecord]) -> Result<PathBuf> {
        let mut df = analyzed_frame(records, false)?;
        self.write_frame(&self.output.analyzed_file, &mut df)
    }

    /// Write the new discrepancies, including the per-GLN count
    pub fn write_new(&self, records: &[AnalyzedRecord]) -> Result<PathBuf> {
        let mut df = analyzed_frame(records, true)?;
        self.write_frame(&self.output.new_discrepancies_file, &mut df)
    }

    /// Write the resolved snapshot entries
    pub fn write_resolved(&self, entries: &[SnapshotEntry]) -> Result<PathBuf> {
        let mut df = snapshot_frame(entries)?;
        self.write_frame(&self.output.resolved_discrepancies_file, &mut df)
    }

    /// Write all three export files
    ///
    /// # Returns
    ///
    /// Paths of the analyzed, new and resolved files, in that order
    pub fn export_all(&self, records: &[AnalyzedRecord], diff: &WeeklyDiff) -> Result<Vec<PathBuf>> {
        let paths = vec![
            self.write_analyzed(records)?,
            self.write_new(&diff.new_discrepancies)?,
            self.write_resolved(&diff.resolved_discrepancies)?,
        ];
        info!(
            "Exported {} files to {}",
            paths.len(),
            self.output.output_dir.display()
        );
        Ok(paths)
    }

    fn write_frame(&self, file_name: &str, df: &mut DataFrame) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output.output_dir).map_err(|e| {
            Error::io(
                format!(
                    "Failed to create output directory {}",
                    self.output.output_dir.display()
                ),
                e,
            )
        })?;

        let path = self.output.output_dir.join(file_name);
        let mut file = File::create(&path)
            .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| Error::export(path.display().to_string(), e.to_string()))?;

        debug!("Wrote {} rows to {}", df.height(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::AddressRecord;
    use tempfile::TempDir;

    fn analyzed(account: &str, gln: &str, label: &str) -> AnalyzedRecord {
        AnalyzedRecord {
            record: AddressRecord::new(account, gln, "123 Main St").with_location_id("L1"),
            normalized_address: "123 MAIN".to_string(),
            unique_addresses_for_gln: 2,
            discrepancy: label.to_string(),
        }
    }

    fn exporter(dir: &TempDir) -> CsvExporter {
        let output = OutputConfig {
            output_dir: dir.path().join("out"),
            ..OutputConfig::default()
        };
        CsvExporter::new(&output)
    }

    fn header(path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_analyzed_export_omits_unique_count() {
        let dir = TempDir::new().unwrap();
        let path = exporter(&dir)
            .write_analyzed(&[analyzed("000417", "0012345678905", "")])
            .unwrap();

        let header = header(&path);
        assert!(header.starts_with("NATL_GRP_NAM,INA_LOC_ID,SHIP_TO_GLN,CUST_ACCT_ID"));
        assert!(header.ends_with("VPS_NAME,Normalized_Address,Discrepancy"));
        assert!(!header.contains("Unique_Addresses_for_GLN"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("0012345678905"));
        assert!(contents.contains("000417"));
    }

    #[test]
    fn test_new_export_includes_unique_count() {
        let dir = TempDir::new().unwrap();
        let path = exporter(&dir)
            .write_new(&[analyzed("1", "G1", "Multiple Addresses for SHIP_TO_GLN")])
            .unwrap();

        assert!(header(&path).ends_with("Normalized_Address,Unique_Addresses_for_GLN,Discrepancy"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains(",2,Multiple Addresses for SHIP_TO_GLN"));
    }

    #[test]
    fn test_resolved_export_uses_snapshot_columns() {
        let dir = TempDir::new().unwrap();
        let path = exporter(&dir)
            .write_resolved(&[analyzed("9", "G9", "").to_snapshot()])
            .unwrap();

        assert_eq!(
            header(&path),
            "CUST_ACCT_ID,NORMALIZED_ADDRESS,INA_LOC_ID,SHIP_TO_GLN,DISCREPANCY"
        );
    }

    #[test]
    fn test_export_all_writes_three_files() {
        let dir = TempDir::new().unwrap();
        let records = vec![analyzed("1", "G1", ""), analyzed("2", "G2", "")];
        let diff = WeeklyDiff {
            new_discrepancies: records.clone(),
            resolved_discrepancies: Vec::new(),
        };

        let paths = exporter(&dir).export_all(&records, &diff).unwrap();

        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(paths[0].ends_with("analyzed_data.csv"));
        assert!(paths[2].ends_with("resolved_discrepancies.csv"));
    }

    #[test]
    fn test_frames_have_expected_shape() {
        let records = vec![analyzed("1", "G1", "")];
        assert_eq!(analyzed_frame(&records, false).unwrap().width(), 17);
        assert_eq!(analyzed_frame(&records, true).unwrap().width(), 18);
        assert_eq!(snapshot_frame(&[]).unwrap().height(), 0);
        assert_eq!(stored_frame(&[]).unwrap().width(), 20);
    }

    #[test]
    fn test_stored_rows_written_to_any_writer() {
        let row = StoredDiscrepancy {
            record: AddressRecord::new("5", "G5", "5 Ash"),
            normalized_address: "5 ASH".to_string(),
            discrepancy: String::new(),
            date_record_pulled: "07-2024".to_string(),
            notes: Some("called".to_string()),
            status: Some(crate::ReviewStatus::InProgress),
        };
        let mut df = stored_frame(&[row]).unwrap();
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &mut df).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.lines().next().unwrap().ends_with("DATE_RECORD_PULLED,NOTES,STATUS"));
        assert!(text.contains("07-2024,called,In Progress"));
    }
}
