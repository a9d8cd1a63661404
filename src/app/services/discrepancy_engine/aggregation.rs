//! Normalization and grouping stages of the discrepancy engine
//!
//! These stages turn input records into analyzed records carrying their
//! normalized address and per-GLN address count, then summarize the batch by
//! normalized address in first-appearance order.

use crate::app::models::{AddressRecord, AnalyzedRecord};
use crate::app::services::address_normalizer::normalize_address;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Records sharing one normalized address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressGroup {
    pub normalized_address: String,

    /// Distinct GLNs among the group's records
    pub distinct_glns: usize,

    /// `unique_addresses_for_gln` of the first record (in input order) of the group
    pub first_unique_addresses_for_gln: usize,

    /// Indices of the group's records in the batch, ascending
    pub rows: Vec<usize>,
}

/// Normalize every record's delivery address
///
/// Counts and labels are left empty for the later stages.
pub fn normalize_records(records: Vec<AddressRecord>) -> Vec<AnalyzedRecord> {
    records
        .into_iter()
        .map(|record| {
            let normalized_address = normalize_address(&record.delivery_address);
            AnalyzedRecord {
                record,
                normalized_address,
                unique_addresses_for_gln: 0,
                discrepancy: String::new(),
            }
        })
        .collect()
}

/// Attach the number of distinct normalized addresses of each record's GLN
///
/// # Returns
///
/// The number of distinct GLNs in the batch
pub fn attach_gln_address_counts(records: &mut [AnalyzedRecord]) -> usize {
    let mut addresses_by_gln: HashMap<String, HashSet<String>> = HashMap::new();
    for analyzed in records.iter() {
        addresses_by_gln
            .entry(analyzed.record.gln.clone())
            .or_default()
            .insert(analyzed.normalized_address.clone());
    }

    for analyzed in records.iter_mut() {
        analyzed.unique_addresses_for_gln = addresses_by_gln
            .get(&analyzed.record.gln)
            .map_or(0, HashSet::len);
    }

    let multi_address_glns = addresses_by_gln
        .values()
        .filter(|addresses| addresses.len() > 1)
        .count();
    debug!(
        "{} GLNs, {} with more than one address",
        addresses_by_gln.len(),
        multi_address_glns
    );

    addresses_by_gln.len()
}

/// Group records by normalized address, in order of first appearance
pub fn summarize_address_groups(records: &[AnalyzedRecord]) -> Vec<AddressGroup> {
    let mut index_by_address: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<AddressGroup> = Vec::new();
    let mut glns_by_group: Vec<HashSet<&str>> = Vec::new();

    for (row, analyzed) in records.iter().enumerate() {
        let address = analyzed.normalized_address.as_str();
        let index = *index_by_address.entry(address).or_insert_with(|| {
            groups.push(AddressGroup {
                normalized_address: address.to_string(),
                distinct_glns: 0,
                first_unique_addresses_for_gln: analyzed.unique_addresses_for_gln,
                rows: Vec::new(),
            });
            glns_by_group.push(HashSet::new());
            groups.len() - 1
        });

        groups[index].rows.push(row);
        glns_by_group[index].insert(analyzed.record.gln.as_str());
    }

    for (group, glns) in groups.iter_mut().zip(&glns_by_group) {
        group.distinct_glns = glns.len();
    }

    debug!("{} distinct normalized addresses", groups.len());
    groups
}
