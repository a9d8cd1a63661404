//! Loading account records from the upstream extract
//!
//! The extract is a CSV file carrying the upstream column names. Every column
//! is read as text so identifiers such as GLNs and ZIP codes keep their
//! leading zeros.

use crate::app::models::AddressRecord;
use crate::constants::columns;
use crate::{Error, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supplier of the batch of records to analyze
pub trait RecordSource {
    /// Load and validate every record of the batch
    fn fetch_records(&self) -> Result<Vec<AddressRecord>>;

    /// Short human-readable description for logs and reports
    fn describe(&self) -> String;
}

/// Record source backed by a CSV extract
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the extract into a frame of string columns
    pub fn read_frame(&self) -> Result<DataFrame> {
        if !self.path.is_file() {
            return Err(Error::io(
                format!("Input extract {} not found", self.path.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(self.path.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| Error::polars(format!("Failed to read {}", self.path.display()), e))
    }
}

impl RecordSource for CsvRecordSource {
    fn fetch_records(&self) -> Result<Vec<AddressRecord>> {
        let df = self.read_frame()?;
        debug!(
            "Read {} rows x {} columns from {}",
            df.height(),
            df.width(),
            self.path.display()
        );

        let records = records_from_frame(&df)?;
        info!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("CSV extract {}", self.path.display())
    }
}

/// Record source over records already in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    records: Vec<AddressRecord>,
}

impl InMemoryRecordSource {
    pub fn new(records: Vec<AddressRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for InMemoryRecordSource {
    fn fetch_records(&self) -> Result<Vec<AddressRecord>> {
        for (index, record) in self.records.iter().enumerate() {
            record.validate(index + 1)?;
        }
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory records", self.records.len())
    }
}

/// Convert a frame with the upstream column names into records
///
/// Required columns must be present and non-null on every row; optional
/// columns may be missing entirely. Unknown columns are ignored.
///
/// # Arguments
///
/// * `df` - Frame whose extract columns are all string-typed
///
/// # Returns
///
/// The records in frame order, or the first validation error (1-based row)
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<AddressRecord>> {
    for required in columns::REQUIRED_COLUMNS {
        if df.get_column_index(required).is_none() {
            return Err(Error::missing_column(required));
        }
    }

    let mut extract_columns: Vec<Option<&StringChunked>> =
        Vec::with_capacity(columns::INPUT_COLUMNS.len());
    for name in columns::INPUT_COLUMNS {
        let column = match df.get_column_index(name) {
            Some(_) => Some(
                df.column(name)?
                    .as_materialized_series()
                    .str()
                    .map_err(|e| Error::polars(format!("Column {} is not text", name), e))?,
            ),
            None => {
                debug!("Optional column {} absent from extract", name);
                None
            }
        };
        extract_columns.push(column);
    }

    let value = |column: usize, row: usize| -> Option<String> {
        extract_columns[column]
            .and_then(|values| values.get(row))
            .map(str::to_string)
    };
    let required = |column: usize, row: usize| -> Result<String> {
        value(column, row).ok_or_else(|| {
            Error::data_validation(row + 1, columns::INPUT_COLUMNS[column], "missing value")
        })
    };

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let record = AddressRecord {
            group_name: value(0, row),
            location_id: value(1, row),
            gln: required(2, row)?,
            account_id: required(3, row)?,
            account_name: value(4, row),
            delivery_address: required(5, row)?,
            city: value(6, row),
            state: value(7, row),
            zip: value(8, row),
            dea_number: value(9, row),
            chain_id: value(10, row),
            chain_name: value(11, row),
            home_dc_id: value(12, row),
            rep_name: value(13, row),
            vps_name: value(14, row),
        };
        record.validate(row + 1)?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_extract(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("extract.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_full_extract() {
        let dir = TempDir::new().unwrap();
        let path = write_extract(
            &dir,
            "NATL_GRP_NAM,INA_LOC_ID,SHIP_TO_GLN,CUST_ACCT_ID,CUST_ACCT_NAM,ACCT_DLVRY_ADDR,\
ACCT_DLVRY_CTY_NAM,ACCT_DLVRY_ST_ABRV,ACCT_DLVRY_ZIP,DEA_NUM,CUST_CHN_ID,CUST_CHN_NAME,\
HOME_DC_ID,REP_NAME,VPS_NAME\n\
NORTHEAST,L01,0012345678905,000417,Corner Pharmacy,123 Main St,Boston,MA,02110,AB1234567,\
C9,Corner Chain,DC4,Pat Rep,Lee Vps\n",
        );

        let records = CsvRecordSource::new(&path).fetch_records().unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.gln, "0012345678905");
        assert_eq!(record.account_id, "000417");
        assert_eq!(record.zip.as_deref(), Some("02110"));
        assert_eq!(record.group_name.as_deref(), Some("NORTHEAST"));
        assert_eq!(record.vps_name.as_deref(), Some("Lee Vps"));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let dir = TempDir::new().unwrap();
        let path = write_extract(
            &dir,
            "CUST_ACCT_ID,SHIP_TO_GLN,ACCT_DLVRY_ADDR\n1,G1,1 Elm St\n2,G2,\"2 Oak Ave, Suite 4\"\n",
        );

        let records = CsvRecordSource::new(&path).fetch_records().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].delivery_address, "2 Oak Ave, Suite 4");
        assert!(records[0].location_id.is_none());
    }

    #[test]
    fn test_missing_required_column() {
        let dir = TempDir::new().unwrap();
        let path = write_extract(&dir, "CUST_ACCT_ID,SHIP_TO_GLN\n1,G1\n");

        let result = CsvRecordSource::new(&path).fetch_records();
        assert!(matches!(
            result,
            Err(Error::MissingColumn { ref column }) if column == "ACCT_DLVRY_ADDR"
        ));
    }

    #[test]
    fn test_missing_required_value_names_row() {
        let dir = TempDir::new().unwrap();
        let path = write_extract(
            &dir,
            "CUST_ACCT_ID,SHIP_TO_GLN,ACCT_DLVRY_ADDR\n1,G1,1 Elm St\n2,,2 Elm St\n",
        );

        match CsvRecordSource::new(&path).fetch_records() {
            Err(Error::DataValidation { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "SHIP_TO_GLN");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = CsvRecordSource::new(dir.path().join("absent.csv")).fetch_records();
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_in_memory_source_validates() {
        let source = InMemoryRecordSource::new(vec![
            AddressRecord::new("1", "G1", "1 Elm St"),
            AddressRecord::new(" ", "G2", "2 Elm St"),
        ]);
        assert!(source.fetch_records().is_err());
        assert_eq!(source.describe(), "2 in-memory records");
    }
}
