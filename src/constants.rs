//! Application constants for the GLN reconciler
//!
//! This module contains discrepancy phrases, column and table names, default
//! values and file names used throughout the application.

// =============================================================================
// Discrepancy Labels
// =============================================================================

/// Phrases composing a discrepancy label
pub mod labels {
    /// A GLN is associated with more than one normalized address
    pub const MULTIPLE_ADDRESSES_FOR_GLN: &str = "Multiple Addresses for SHIP_TO_GLN";

    /// A normalized address is associated with more than one GLN
    pub const MULTIPLE_GLNS_PER_ADDRESS: &str = "Multiple SHIP_TO_GLN per Address";

    /// Separator used when both phrases apply
    pub const SEPARATOR: &str = ", ";
}

// =============================================================================
// Matching Defaults
// =============================================================================

/// Default fuzzy-match score (0-100) at which two addresses are treated as the same
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 90;

/// Highest score the similarity ratio can produce
pub const MAX_SIMILARITY_SCORE: u8 = 100;

/// Default ceiling on distinct addresses for the pairwise similarity pass (0 = unlimited)
///
/// The pass compares every pair of distinct addresses, so 10,000 addresses
/// already means ~50 million comparisons. A configured ceiling rejects larger
/// batches with an error rather than skipping the pass.
pub const DEFAULT_MAX_SIMILARITY_ADDRESSES: usize = 0;

// =============================================================================
// Column Names
// =============================================================================

/// Column names of the upstream extract and of the analyzed output
pub mod columns {
    pub const NATL_GRP_NAM: &str = "NATL_GRP_NAM";
    pub const INA_LOC_ID: &str = "INA_LOC_ID";
    pub const SHIP_TO_GLN: &str = "SHIP_TO_GLN";
    pub const CUST_ACCT_ID: &str = "CUST_ACCT_ID";
    pub const CUST_ACCT_NAM: &str = "CUST_ACCT_NAM";
    pub const ACCT_DLVRY_ADDR: &str = "ACCT_DLVRY_ADDR";
    pub const ACCT_DLVRY_CTY_NAM: &str = "ACCT_DLVRY_CTY_NAM";
    pub const ACCT_DLVRY_ST_ABRV: &str = "ACCT_DLVRY_ST_ABRV";
    pub const ACCT_DLVRY_ZIP: &str = "ACCT_DLVRY_ZIP";
    pub const DEA_NUM: &str = "DEA_NUM";
    pub const CUST_CHN_ID: &str = "CUST_CHN_ID";
    pub const CUST_CHN_NAME: &str = "CUST_CHN_NAME";
    pub const HOME_DC_ID: &str = "HOME_DC_ID";
    pub const REP_NAME: &str = "REP_NAME";
    pub const VPS_NAME: &str = "VPS_NAME";

    /// Derived columns as they appear in CSV exports
    pub const NORMALIZED_ADDRESS: &str = "Normalized_Address";
    pub const UNIQUE_ADDRESSES_FOR_GLN: &str = "Unique_Addresses_for_GLN";
    pub const DISCREPANCY: &str = "Discrepancy";

    /// Derived and review columns as they appear in the discrepancy store
    pub const STORED_NORMALIZED_ADDRESS: &str = "NORMALIZED_ADDRESS";
    pub const STORED_DISCREPANCY: &str = "DISCREPANCY";
    pub const DATE_RECORD_PULLED: &str = "DATE_RECORD_PULLED";
    pub const NOTES: &str = "NOTES";
    pub const STATUS: &str = "STATUS";

    /// Input columns in extract order
    pub const INPUT_COLUMNS: [&str; 15] = [
        NATL_GRP_NAM,
        INA_LOC_ID,
        SHIP_TO_GLN,
        CUST_ACCT_ID,
        CUST_ACCT_NAM,
        ACCT_DLVRY_ADDR,
        ACCT_DLVRY_CTY_NAM,
        ACCT_DLVRY_ST_ABRV,
        ACCT_DLVRY_ZIP,
        DEA_NUM,
        CUST_CHN_ID,
        CUST_CHN_NAME,
        HOME_DC_ID,
        REP_NAME,
        VPS_NAME,
    ];

    /// Columns every input row must carry a value for
    pub const REQUIRED_COLUMNS: [&str; 3] = [SHIP_TO_GLN, CUST_ACCT_ID, ACCT_DLVRY_ADDR];

    /// Columns of the current-discrepancies table after the input columns
    pub const STORED_EXTRA_COLUMNS: [&str; 5] = [
        STORED_NORMALIZED_ADDRESS,
        STORED_DISCREPANCY,
        DATE_RECORD_PULLED,
        NOTES,
        STATUS,
    ];

    /// Columns of the previous-discrepancies snapshot, in table order
    pub const SNAPSHOT_COLUMNS: [&str; 5] = [
        CUST_ACCT_ID,
        STORED_NORMALIZED_ADDRESS,
        INA_LOC_ID,
        SHIP_TO_GLN,
        STORED_DISCREPANCY,
    ];
}

// =============================================================================
// Storage
// =============================================================================

/// Discrepancy store table names
pub mod tables {
    /// Every analyzed row of every run, with review annotations
    pub const CURRENT_DISCREPANCIES: &str = "CURRENT_DISCREPANCIES";

    /// Snapshot of the latest run, used for the week-over-week diff
    pub const PREVIOUS_DISCREPANCIES: &str = "PREVIOUS_DISCREPANCIES";
}

/// chrono format of DATE_RECORD_PULLED: Sunday-based week number, then year
pub const WEEK_STAMP_FORMAT: &str = "%U-%Y";

// =============================================================================
// Files and Paths
// =============================================================================

/// Application directory name under the user's config/data directories
pub const APP_DIR_NAME: &str = "gln-recon";

/// Configuration file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default SQLite database file name
pub const DEFAULT_DATABASE_FILE: &str = "discrepancies.db";

/// Default output directory for CSV exports
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default export file names
pub mod files {
    pub const ANALYZED_DATA: &str = "analyzed_data.csv";
    pub const NEW_DISCREPANCIES: &str = "new_discrepancies.csv";
    pub const RESOLVED_DISCREPANCIES: &str = "resolved_discrepancies.csv";
}

/// Environment variables consulted by the layered configuration
pub mod env {
    pub const THRESHOLD: &str = "GLN_RECON_THRESHOLD";
    pub const DATABASE: &str = "GLN_RECON_DATABASE";
    pub const OUTPUT: &str = "GLN_RECON_OUTPUT";
}

/// Progress bar template shared by long-running passes
pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
