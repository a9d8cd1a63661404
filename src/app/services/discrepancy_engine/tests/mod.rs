//! Tests for the discrepancy engine module
//!
//! Shared fixtures for building record batches live here.

pub mod propagation_tests;

use crate::app::models::{AddressRecord, AnalyzedRecord};
use crate::app::services::discrepancy_engine::DiscrepancyEngine;

/// Create a test record with the required fields only
pub fn create_test_record(account_id: &str, gln: &str, address: &str) -> AddressRecord {
    AddressRecord::new(account_id, gln, address)
}

/// Build a batch from `(account_id, gln, address)` triples
pub fn create_batch(rows: &[(&str, &str, &str)]) -> Vec<AddressRecord> {
    rows.iter()
        .map(|(account, gln, address)| create_test_record(account, gln, address))
        .collect()
}

/// The three-record batch used to illustrate the engine
///
/// GLN A carries two addresses; "123 Main St" and "123 Main Street" collapse
/// to the same normalized address under GLNs A and B.
pub fn create_three_record_batch() -> Vec<AddressRecord> {
    create_batch(&[
        ("1001", "A", "123 Main St"),
        ("1002", "A", "456 Oak Ave"),
        ("1003", "B", "123 Main Street"),
    ])
}

/// Three 50-character addresses forming a similarity chain at threshold 97
///
/// Neighbours differ by one substitution (score 98); the two ends differ by
/// two (score 96).
pub fn create_chain_addresses() -> (String, String, String) {
    let base = "0123456789".repeat(5);
    let left = format!("{}A", &base[..49]);
    let right = format!("B{}", &base[1..]);
    (left, base, right)
}

/// Engine configured for the similarity chain
pub fn create_chain_engine() -> DiscrepancyEngine {
    DiscrepancyEngine::default().with_threshold(97)
}

/// Label of the first analyzed record with this account id
pub fn label_of<'a>(records: &'a [AnalyzedRecord], account_id: &str) -> &'a str {
    records
        .iter()
        .find(|r| r.record.account_id == account_id)
        .map(|r| r.discrepancy.as_str())
        .unwrap_or_else(|| panic!("no record for account {}", account_id))
}
