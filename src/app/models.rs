//! Data models for GLN reconciliation
//!
//! This module contains the core data structures for representing account
//! delivery records as they arrive from the upstream extract, the records the
//! discrepancy engine produces, and the rows kept in the discrepancy store.

use crate::constants::columns;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Input Record
// =============================================================================

/// One account row of the upstream extract
///
/// Identifiers are opaque strings. The GLN, account id and delivery address
/// are required; every other field is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub struct AddressRecord {
    /// National group name (NATL_GRP_NAM)
    pub group_name: Option<String>,

    /// Internal location id (INA_LOC_ID)
    pub location_id: Option<String>,

    /// Ship-to Global Location Number (SHIP_TO_GLN)
    pub gln: String,

    /// Customer account id (CUST_ACCT_ID)
    pub account_id: String,

    /// Customer account name (CUST_ACCT_NAM)
    pub account_name: Option<String>,

    /// Raw delivery address line (ACCT_DLVRY_ADDR)
    pub delivery_address: String,

    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,

    /// DEA registration number (DEA_NUM)
    pub dea_number: Option<String>,

    pub chain_id: Option<String>,
    pub chain_name: Option<String>,

    /// Home distribution center (HOME_DC_ID)
    pub home_dc_id: Option<String>,

    pub rep_name: Option<String>,
    pub vps_name: Option<String>,
}

impl AddressRecord {
    /// Create a record with the required fields and no descriptive fields
    pub fn new(
        account_id: impl Into<String>,
        gln: impl Into<String>,
        delivery_address: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            gln: gln.into(),
            delivery_address: delivery_address.into(),
            ..Default::default()
        }
    }

    /// Set the national group name
    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    /// Set the location id
    pub fn with_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    /// Validate that the identifiers used for grouping are present
    ///
    /// # Arguments
    ///
    /// * `row` - 1-based data row used in the error message
    pub fn validate(&self, row: usize) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(Error::data_validation(
                row,
                columns::CUST_ACCT_ID,
                "account id is blank",
            ));
        }
        if self.gln.trim().is_empty() {
            return Err(Error::data_validation(
                row,
                columns::SHIP_TO_GLN,
                "GLN is blank",
            ));
        }
        Ok(())
    }

    /// Value of an extract column by its upstream name
    ///
    /// Returns `None` for unknown columns and for absent optional values.
    pub fn column_value(&self, column: &str) -> Option<&str> {
        match column {
            columns::NATL_GRP_NAM => self.group_name.as_deref(),
            columns::INA_LOC_ID => self.location_id.as_deref(),
            columns::SHIP_TO_GLN => Some(&self.gln),
            columns::CUST_ACCT_ID => Some(&self.account_id),
            columns::CUST_ACCT_NAM => self.account_name.as_deref(),
            columns::ACCT_DLVRY_ADDR => Some(&self.delivery_address),
            columns::ACCT_DLVRY_CTY_NAM => self.city.as_deref(),
            columns::ACCT_DLVRY_ST_ABRV => self.state.as_deref(),
            columns::ACCT_DLVRY_ZIP => self.zip.as_deref(),
            columns::DEA_NUM => self.dea_number.as_deref(),
            columns::CUST_CHN_ID => self.chain_id.as_deref(),
            columns::CUST_CHN_NAME => self.chain_name.as_deref(),
            columns::HOME_DC_ID => self.home_dc_id.as_deref(),
            columns::REP_NAME => self.rep_name.as_deref(),
            columns::VPS_NAME => self.vps_name.as_deref(),
            _ => None,
        }
    }

    /// Values of all extract columns, in extract order
    pub fn column_values(&self) -> [Option<&str>; 15] {
        columns::INPUT_COLUMNS.map(|column| self.column_value(column))
    }
}

// =============================================================================
// Engine Output
// =============================================================================

/// An input record annotated by the discrepancy engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedRecord {
    /// The record as loaded
    pub record: AddressRecord,

    /// Canonical form of the delivery address
    pub normalized_address: String,

    /// Distinct normalized addresses seen for this record's GLN
    pub unique_addresses_for_gln: usize,

    /// Discrepancy label shared by every record with the same normalized address
    pub discrepancy: String,
}

impl AnalyzedRecord {
    /// Whether this record carries a non-empty discrepancy label
    pub fn has_discrepancy(&self) -> bool {
        !self.discrepancy.is_empty()
    }

    /// Snapshot entry kept for the next week's diff
    pub fn to_snapshot(&self) -> SnapshotEntry {
        SnapshotEntry {
            account_id: self.record.account_id.clone(),
            normalized_address: self.normalized_address.clone(),
            location_id: self.record.location_id.clone(),
            gln: self.record.gln.clone(),
            discrepancy: self.discrepancy.clone(),
        }
    }
}

// =============================================================================
// Stored Rows
// =============================================================================

/// Review status of a stored discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl ReviewStatus {
    /// All statuses in workflow order
    pub const ALL: [ReviewStatus; 4] = [
        ReviewStatus::Open,
        ReviewStatus::InProgress,
        ReviewStatus::Resolved,
        ReviewStatus::Closed,
    ];

    /// Text stored in the STATUS column
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Open => "Open",
            ReviewStatus::InProgress => "In Progress",
            ReviewStatus::Resolved => "Resolved",
            ReviewStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "open" => Ok(ReviewStatus::Open),
            "in progress" => Ok(ReviewStatus::InProgress),
            "resolved" => Ok(ReviewStatus::Resolved),
            "closed" => Ok(ReviewStatus::Closed),
            _ => Err(Error::unknown_review_status(s)),
        }
    }
}

/// A row of the current-discrepancies table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDiscrepancy {
    pub record: AddressRecord,
    pub normalized_address: String,
    pub discrepancy: String,

    /// Week stamp of the run that stored this row (`%U-%Y`)
    pub date_record_pulled: String,

    pub notes: Option<String>,
    pub status: Option<ReviewStatus>,
}

impl StoredDiscrepancy {
    /// Value of a stored column by its table name
    pub fn column_value(&self, column: &str) -> Option<&str> {
        match column {
            columns::STORED_NORMALIZED_ADDRESS => Some(&self.normalized_address),
            columns::STORED_DISCREPANCY => Some(&self.discrepancy),
            columns::DATE_RECORD_PULLED => Some(&self.date_record_pulled),
            columns::NOTES => self.notes.as_deref(),
            columns::STATUS => self.status.as_ref().map(ReviewStatus::as_str),
            other => self.record.column_value(other),
        }
    }

    /// Names of every stored column, in table order
    pub fn column_names() -> impl Iterator<Item = &'static str> {
        columns::INPUT_COLUMNS
            .into_iter()
            .chain(columns::STORED_EXTRA_COLUMNS)
    }
}

/// A row of the previous-discrepancies snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub account_id: String,
    pub normalized_address: String,
    pub location_id: Option<String>,
    pub gln: String,
    pub discrepancy: String,
}
