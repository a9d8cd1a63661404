//! Mismatch pre-filter applied to a raw extract
//!
//! Keeps only the records that can take part in a GLN/location mismatch
//! within their national group:
//!
//! - the (group, location id) pair maps to more than one distinct GLN, or
//! - the (group, GLN) pair maps to more than one distinct location id.
//!
//! Records missing the group name or the location id never qualify. Exact
//! duplicates are dropped and the result is sorted by every extract column,
//! absent values last.

use crate::app::models::AddressRecord;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Reduce a batch to mismatch candidates
///
/// # Arguments
///
/// * `records` - The full extract
///
/// # Returns
///
/// Deduplicated candidate records sorted by all extract columns
pub fn select_candidates(records: Vec<AddressRecord>) -> Vec<AddressRecord> {
    let input_count = records.len();

    let mut glns_by_location: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
    let mut locations_by_gln: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
    for record in &records {
        if let (Some(group), Some(location)) = (keyed(&record.group_name), keyed(&record.location_id))
        {
            glns_by_location
                .entry((group, location))
                .or_default()
                .insert(record.gln.as_str());
            locations_by_gln
                .entry((group, record.gln.as_str()))
                .or_default()
                .insert(location);
        }
    }

    let qualifying: Vec<bool> = records
        .iter()
        .map(|record| {
            let (Some(group), Some(location)) =
                (keyed(&record.group_name), keyed(&record.location_id))
            else {
                return false;
            };
            let shared_location = glns_by_location
                .get(&(group, location))
                .is_some_and(|glns| glns.len() > 1);
            let shared_gln = locations_by_gln
                .get(&(group, record.gln.as_str()))
                .is_some_and(|locations| locations.len() > 1);
            shared_location || shared_gln
        })
        .collect();

    let mut seen = HashSet::new();
    let mut candidates: Vec<AddressRecord> = records
        .into_iter()
        .zip(qualifying)
        .filter_map(|(record, keep)| keep.then_some(record))
        .filter(|record| seen.insert(record.clone()))
        .collect();

    candidates.sort_by(|a, b| compare_columns(a, b));

    info!(
        "Candidate selection kept {} of {} records",
        candidates.len(),
        input_count
    );
    candidates
}

fn keyed(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Column-by-column ordering with absent values after present ones
fn compare_columns(a: &AddressRecord, b: &AddressRecord) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    for (left, right) in a.column_values().into_iter().zip(b.column_values()) {
        let ordering = match (left, right) {
            (Some(l), Some(r)) => l.cmp(r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(group: Option<&str>, location: Option<&str>, gln: &str, account: &str) -> AddressRecord {
        let mut record = AddressRecord::new(account, gln, "1 Elm St");
        record.group_name = group.map(str::to_string);
        record.location_id = location.map(str::to_string);
        record
    }

    #[test]
    fn test_location_with_several_glns_qualifies() {
        let selected = select_candidates(vec![
            record(Some("NE"), Some("L1"), "G1", "1"),
            record(Some("NE"), Some("L1"), "G2", "2"),
            record(Some("NE"), Some("L2"), "G3", "3"),
        ]);

        let accounts: Vec<&str> = selected.iter().map(|r| r.account_id.as_str()).collect();
        assert_eq!(accounts, vec!["1", "2"]);
    }

    #[test]
    fn test_gln_with_several_locations_qualifies() {
        let selected = select_candidates(vec![
            record(Some("NE"), Some("L1"), "G1", "1"),
            record(Some("NE"), Some("L2"), "G1", "2"),
            record(Some("NE"), Some("L3"), "G5", "3"),
        ]);

        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.gln == "G1"));
    }

    #[test]
    fn test_groups_are_independent() {
        let selected = select_candidates(vec![
            record(Some("NE"), Some("L1"), "G1", "1"),
            record(Some("SW"), Some("L1"), "G2", "2"),
        ]);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_rows_without_group_or_location_never_qualify() {
        let selected = select_candidates(vec![
            record(Some("NE"), None, "G1", "1"),
            record(Some("NE"), Some("L1"), "G1", "2"),
            record(Some("NE"), Some("L2"), "G1", "3"),
            record(None, Some("L1"), "G2", "4"),
        ]);

        let accounts: Vec<&str> = selected.iter().map(|r| r.account_id.as_str()).collect();
        assert_eq!(accounts, vec!["2", "3"]);
    }

    #[test]
    fn test_duplicates_removed_and_sorted() {
        let selected = select_candidates(vec![
            record(Some("NE"), Some("L1"), "G2", "9"),
            record(Some("NE"), Some("L1"), "G1", "5"),
            record(Some("NE"), Some("L1"), "G2", "9"),
        ]);

        let glns: Vec<&str> = selected.iter().map(|r| r.gln.as_str()).collect();
        assert_eq!(glns, vec!["G1", "G2"]);
    }

    #[test]
    fn test_absent_values_sort_last() {
        let mut with_name = record(Some("NE"), Some("L1"), "G1", "1");
        with_name.account_name = Some("Zed".to_string());
        let without_name = record(Some("NE"), Some("L1"), "G1", "1");
        let other_gln = record(Some("NE"), Some("L1"), "G2", "2");

        let selected = select_candidates(vec![without_name.clone(), other_gln, with_name.clone()]);

        assert_eq!(selected[0], with_name);
        assert_eq!(selected[1], without_name);
        assert_eq!(selected[2].gln, "G2");
    }
}
