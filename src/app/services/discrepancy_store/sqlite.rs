//! SQLite-backed discrepancy store

use crate::app::models::{
    AddressRecord, AnalyzedRecord, ReviewStatus, SnapshotEntry, StoredDiscrepancy,
};
use crate::{Error, Result};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use tracing::{debug, info};

use super::DiscrepancyStore;

const CREATE_CURRENT_TABLE: &str = "CREATE TABLE IF NOT EXISTS CURRENT_DISCREPANCIES (
    NATL_GRP_NAM TEXT,
    INA_LOC_ID TEXT,
    SHIP_TO_GLN TEXT,
    CUST_ACCT_ID TEXT,
    CUST_ACCT_NAM TEXT,
    ACCT_DLVRY_ADDR TEXT,
    ACCT_DLVRY_CTY_NAM TEXT,
    ACCT_DLVRY_ST_ABRV TEXT,
    ACCT_DLVRY_ZIP TEXT,
    DEA_NUM TEXT,
    CUST_CHN_ID TEXT,
    CUST_CHN_NAME TEXT,
    HOME_DC_ID TEXT,
    REP_NAME TEXT,
    VPS_NAME TEXT,
    NORMALIZED_ADDRESS TEXT,
    DISCREPANCY TEXT,
    DATE_RECORD_PULLED TEXT,
    NOTES TEXT,
    STATUS TEXT
)";

const CREATE_PREVIOUS_TABLE: &str = "CREATE TABLE IF NOT EXISTS PREVIOUS_DISCREPANCIES (
    CUST_ACCT_ID TEXT,
    NORMALIZED_ADDRESS TEXT,
    INA_LOC_ID TEXT,
    SHIP_TO_GLN TEXT,
    DISCREPANCY TEXT
)";

const CREATE_ACCOUNT_INDEX: &str = "CREATE INDEX IF NOT EXISTS IDX_CURRENT_ACCOUNT
    ON CURRENT_DISCREPANCIES (CUST_ACCT_ID)";

const INSERT_CURRENT: &str = "INSERT INTO CURRENT_DISCREPANCIES (
    NATL_GRP_NAM, INA_LOC_ID, SHIP_TO_GLN, CUST_ACCT_ID, CUST_ACCT_NAM,
    ACCT_DLVRY_ADDR, ACCT_DLVRY_CTY_NAM, ACCT_DLVRY_ST_ABRV, ACCT_DLVRY_ZIP, DEA_NUM,
    CUST_CHN_ID, CUST_CHN_NAME, HOME_DC_ID, REP_NAME, VPS_NAME,
    NORMALIZED_ADDRESS, DISCREPANCY, DATE_RECORD_PULLED, NOTES, STATUS
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, NULL, NULL)";

const SELECT_CURRENT: &str = "SELECT
    NATL_GRP_NAM, INA_LOC_ID, SHIP_TO_GLN, CUST_ACCT_ID, CUST_ACCT_NAM,
    ACCT_DLVRY_ADDR, ACCT_DLVRY_CTY_NAM, ACCT_DLVRY_ST_ABRV, ACCT_DLVRY_ZIP, DEA_NUM,
    CUST_CHN_ID, CUST_CHN_NAME, HOME_DC_ID, REP_NAME, VPS_NAME,
    NORMALIZED_ADDRESS, DISCREPANCY, DATE_RECORD_PULLED, NOTES, STATUS
FROM CURRENT_DISCREPANCIES ORDER BY rowid";

const INSERT_PREVIOUS: &str = "INSERT INTO PREVIOUS_DISCREPANCIES (
    CUST_ACCT_ID, NORMALIZED_ADDRESS, INA_LOC_ID, SHIP_TO_GLN, DISCREPANCY
) VALUES (?1, ?2, ?3, ?4, ?5)";

const SELECT_PREVIOUS: &str = "SELECT
    CUST_ACCT_ID, NORMALIZED_ADDRESS, INA_LOC_ID, SHIP_TO_GLN, DISCREPANCY
FROM PREVIOUS_DISCREPANCIES ORDER BY rowid";

const UPDATE_REVIEW: &str = "UPDATE CURRENT_DISCREPANCIES
    SET NOTES = COALESCE(?1, NOTES), STATUS = ?2
    WHERE CUST_ACCT_ID = ?3";

/// Stored row before its status text is parsed
struct RawStoredRow {
    stored: StoredDiscrepancy,
    status: Option<String>,
}

/// Discrepancy store in a single SQLite database file
#[derive(Debug)]
pub struct SqliteDiscrepancyStore {
    conn: Connection,
}

impl SqliteDiscrepancyStore {
    /// Open (or create) the database at `path` and ensure the schema
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(
                    format!("Failed to create database directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::database(format!("Failed to open database {}", path.display()), e)
        })?;
        debug!("Opened discrepancy store {}", path.display());

        let mut store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Open a private in-memory database with the schema in place
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database("Failed to open in-memory database", e))?;
        let mut store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Number of rows in the current table
    pub fn current_row_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM CURRENT_DISCREPANCIES", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }
}

fn stored_from_row(row: &Row<'_>) -> rusqlite::Result<RawStoredRow> {
    let text = |index: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(index)?.unwrap_or_default())
    };

    let record = AddressRecord {
        group_name: row.get(0)?,
        location_id: row.get(1)?,
        gln: text(2)?,
        account_id: text(3)?,
        account_name: row.get(4)?,
        delivery_address: text(5)?,
        city: row.get(6)?,
        state: row.get(7)?,
        zip: row.get(8)?,
        dea_number: row.get(9)?,
        chain_id: row.get(10)?,
        chain_name: row.get(11)?,
        home_dc_id: row.get(12)?,
        rep_name: row.get(13)?,
        vps_name: row.get(14)?,
    };

    Ok(RawStoredRow {
        stored: StoredDiscrepancy {
            record,
            normalized_address: text(15)?,
            discrepancy: text(16)?,
            date_record_pulled: text(17)?,
            notes: row.get(18)?,
            status: None,
        },
        status: row.get(19)?,
    })
}

impl DiscrepancyStore for SqliteDiscrepancyStore {
    fn ensure_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "{};\n{};\n{};",
                CREATE_CURRENT_TABLE, CREATE_PREVIOUS_TABLE, CREATE_ACCOUNT_INDEX
            ))
            .map_err(|e| Error::database("Failed to create discrepancy tables", e))
    }

    fn append_current(
        &mut self,
        records: &[AnalyzedRecord],
        date_record_pulled: &str,
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_CURRENT)?;
            for analyzed in records {
                let r = &analyzed.record;
                stmt.execute(params![
                    r.group_name,
                    r.location_id,
                    r.gln,
                    r.account_id,
                    r.account_name,
                    r.delivery_address,
                    r.city,
                    r.state,
                    r.zip,
                    r.dea_number,
                    r.chain_id,
                    r.chain_name,
                    r.home_dc_id,
                    r.rep_name,
                    r.vps_name,
                    analyzed.normalized_address,
                    analyzed.discrepancy,
                    date_record_pulled,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| Error::database("Failed to commit current discrepancies", e))?;

        info!(
            "Stored {} rows in CURRENT_DISCREPANCIES for week {}",
            records.len(),
            date_record_pulled
        );
        Ok(records.len())
    }

    fn load_previous(&self) -> Result<Vec<SnapshotEntry>> {
        let mut stmt = self.conn.prepare(SELECT_PREVIOUS)?;
        let rows = stmt.query_map([], |row| {
            Ok(SnapshotEntry {
                account_id: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                normalized_address: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                location_id: row.get(2)?,
                gln: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                discrepancy: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        })?;

        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("Loaded {} previous snapshot entries", entries.len());
        Ok(entries)
    }

    fn replace_previous(&mut self, entries: &[SnapshotEntry]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM PREVIOUS_DISCREPANCIES", [])?;
        {
            let mut stmt = tx.prepare(INSERT_PREVIOUS)?;
            for entry in entries {
                stmt.execute(params![
                    entry.account_id,
                    entry.normalized_address,
                    entry.location_id,
                    entry.gln,
                    entry.discrepancy,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| Error::database("Failed to replace previous discrepancies", e))?;

        info!("Replaced PREVIOUS_DISCREPANCIES with {} entries", entries.len());
        Ok(entries.len())
    }

    fn load_current(&self) -> Result<Vec<StoredDiscrepancy>> {
        let mut stmt = self.conn.prepare(SELECT_CURRENT)?;
        let raw_rows = stmt
            .query_map([], stored_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw_rows
            .into_iter()
            .map(|raw| {
                let mut stored = raw.stored;
                stored.status = match raw.status.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(text) => Some(text.parse::<ReviewStatus>()?),
                };
                Ok(stored)
            })
            .collect()
    }

    fn update_review(
        &mut self,
        account_id: &str,
        notes: Option<&str>,
        status: ReviewStatus,
    ) -> Result<usize> {
        let updated = self
            .conn
            .execute(UPDATE_REVIEW, params![notes, status.as_str(), account_id])
            .map_err(|e| {
                Error::database(format!("Failed to update review for {}", account_id), e)
            })?;

        if updated == 0 {
            return Err(Error::review_target_not_found(account_id));
        }

        info!(
            "Set status '{}' on {} rows of account {}",
            status, updated, account_id
        );
        Ok(updated)
    }
}
