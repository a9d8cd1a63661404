//! Discrepancy label construction for one normalized-address group

use crate::constants::labels;
use serde::Serialize;
use std::fmt;

/// A single kind of GLN/address mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiscrepancyKind {
    /// The GLN is associated with more than one normalized address
    MultipleAddressesForGln,
    /// The normalized address is associated with more than one GLN
    MultipleGlnsPerAddress,
}

impl DiscrepancyKind {
    /// Phrase used in the discrepancy label
    pub fn phrase(&self) -> &'static str {
        match self {
            DiscrepancyKind::MultipleAddressesForGln => labels::MULTIPLE_ADDRESSES_FOR_GLN,
            DiscrepancyKind::MultipleGlnsPerAddress => labels::MULTIPLE_GLNS_PER_ADDRESS,
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Discrepancy kinds that apply to a group, in label order
///
/// # Arguments
///
/// * `addresses_per_gln` - `unique_addresses_for_gln` of the group's first record
/// * `glns_per_address` - distinct GLNs among the group's records
pub fn detect(addresses_per_gln: usize, glns_per_address: usize) -> Vec<DiscrepancyKind> {
    let mut kinds = Vec::with_capacity(2);
    if addresses_per_gln > 1 {
        kinds.push(DiscrepancyKind::MultipleAddressesForGln);
    }
    if glns_per_address > 1 {
        kinds.push(DiscrepancyKind::MultipleGlnsPerAddress);
    }
    kinds
}

/// Build the discrepancy label for a group; empty when nothing applies
pub fn classify(addresses_per_gln: usize, glns_per_address: usize) -> String {
    detect(addresses_per_gln, glns_per_address)
        .iter()
        .map(DiscrepancyKind::phrase)
        .collect::<Vec<_>>()
        .join(labels::SEPARATOR)
}
