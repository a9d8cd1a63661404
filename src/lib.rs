//! GLN Reconciler Library
//!
//! A Rust library for reconciling shipping-location identifiers (GLNs) against
//! the delivery addresses recorded on customer accounts.
//!
//! This library provides tools for:
//! - Canonicalizing free-text delivery addresses for equality comparison
//! - Fuzzy matching of canonical addresses against a similarity threshold
//! - Detecting GLNs with several addresses and addresses with several GLNs
//! - Propagating discrepancy labels across near-duplicate addresses
//! - Loading account extracts, persisting results and diffing them week over week
//! - Review operations for annotating stored discrepancies

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod address_normalizer;
        pub mod candidate_selection;
        pub mod csv_export;
        pub mod discrepancy_engine;
        pub mod discrepancy_store;
        pub mod record_source;
        pub mod review;
        pub mod similarity;
        pub mod weekly_diff;
        pub mod weekly_run;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{AddressRecord, AnalyzedRecord, ReviewStatus, SnapshotEntry, StoredDiscrepancy};
pub use app::services::address_normalizer::normalize_address;
pub use app::services::discrepancy_engine::{DiscrepancyEngine, EngineResult, EngineStats};
pub use app::services::similarity::is_address_similar;
pub use config::Config;

/// Result type alias for the GLN reconciler
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for loading, reconciling, persisting and exporting discrepancies
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Tabular read/write through polars failed
    #[error("Data frame error: {message}")]
    Polars {
        message: String,
        #[source]
        source: polars::error::PolarsError,
    },

    /// Discrepancy store operation failed
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An input row is missing a required value or carries an unusable one
    #[error("Invalid input row {row}, column '{column}': {message}")]
    DataValidation {
        row: usize,
        column: String,
        message: String,
    },

    /// A required column is absent from the input extract
    #[error("Input is missing required column '{column}'")]
    MissingColumn { column: String },

    /// Review status text that is not one of the known statuses
    #[error("Unknown review status '{value}' (expected Open, In Progress, Resolved or Closed)")]
    UnknownReviewStatus { value: String },

    /// Review filter that does not name a stored column
    #[error("Invalid review filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// No stored discrepancy exists for the account being annotated
    #[error("No stored discrepancy for account '{account_id}'")]
    ReviewTargetNotFound { account_id: String },

    /// Writing an export file failed
    #[error("Export error for '{file}': {message}")]
    Export { file: String, message: String },

    /// The batch has more distinct addresses than the configured similarity limit
    #[error(
        "{addresses} distinct addresses exceed max_similarity_addresses = {limit}; \
         raise the limit or set it to 0 for unlimited"
    )]
    SimilarityLimitExceeded { addresses: usize, limit: usize },

    /// Serialization of a report failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a polars error with context
    pub fn polars(message: impl Into<String>, source: polars::error::PolarsError) -> Self {
        Self::Polars {
            message: message.into(),
            source,
        }
    }

    /// Create a database error with context
    pub fn database(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error for a 1-based data row
    pub fn data_validation(
        row: usize,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DataValidation {
            row,
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create an unknown review status error
    pub fn unknown_review_status(value: impl Into<String>) -> Self {
        Self::UnknownReviewStatus {
            value: value.into(),
        }
    }

    /// Create an invalid review filter error
    pub fn invalid_filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            filter: filter.into(),
            message: message.into(),
        }
    }

    /// Create a review target not found error
    pub fn review_target_not_found(account_id: impl Into<String>) -> Self {
        Self::ReviewTargetNotFound {
            account_id: account_id.into(),
        }
    }

    /// Create an export error
    pub fn export(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Export {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a similarity limit error
    pub fn similarity_limit_exceeded(addresses: usize, limit: usize) -> Self {
        Self::SimilarityLimitExceeded { addresses, limit }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(error: polars::error::PolarsError) -> Self {
        Self::Polars {
            message: "Data frame operation failed".to_string(),
            source: error,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database {
            message: "Discrepancy store query failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid configuration file: {}", error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}
