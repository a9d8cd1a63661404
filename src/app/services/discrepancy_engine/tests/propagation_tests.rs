//! Tests for similarity pair discovery and label propagation

use super::*;
use crate::app::services::discrepancy_engine::propagation::{
    SimilarPair, apply_pair_adjustments, find_similar_pairs, propagate_labels,
};
use crate::app::services::discrepancy_engine::stats::EngineStats;
use crate::app::services::similarity::SimilarityMatcher;
use crate::config::PropagationMode;

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn pair(first: usize, second: usize) -> SimilarPair {
    SimilarPair { first, second }
}

#[test]
fn test_pairs_discovered_in_upper_triangular_order() {
    let (left, middle, right) = create_chain_addresses();
    let addresses = [left.as_str(), middle.as_str(), right.as_str()];
    let mut stats = EngineStats::new();

    let pairs = find_similar_pairs(&addresses, &SimilarityMatcher::new(97), &mut stats, None);

    assert_eq!(pairs, vec![pair(0, 1), pair(1, 2)]);
    assert_eq!(stats.pairs_compared, 3);
    assert_eq!(stats.similar_pairs, 2);
}

#[test]
fn test_length_bound_skips_pairs() {
    let addresses = ["1 ELM", "1 ELM SUITE 200 BUILDING C", "1 ELM"];
    let mut stats = EngineStats::new();

    let pairs = find_similar_pairs(&addresses, &SimilarityMatcher::new(90), &mut stats, None);

    assert_eq!(pairs, vec![pair(0, 2)]);
    assert_eq!(stats.pairs_skipped_by_length, 2);
    assert_eq!(stats.pairs_compared, 1);
}

#[test]
fn test_copy_fills_empty_side_only() {
    let mut current = labels(&["X", "", "Y", "Z"]);
    let changed = apply_pair_adjustments(&mut current, &[pair(0, 1), pair(2, 3)]);

    assert_eq!(changed, 1);
    assert_eq!(current, labels(&["X", "X", "Y", "Z"]));
}

#[test]
fn test_copy_runs_in_both_directions() {
    let mut current = labels(&["", "Y"]);
    apply_pair_adjustments(&mut current, &[pair(0, 1)]);
    assert_eq!(current, labels(&["Y", "Y"]));
}

#[test]
fn test_later_pairs_see_earlier_updates() {
    let mut current = labels(&["X", "", ""]);
    apply_pair_adjustments(&mut current, &[pair(0, 1), pair(1, 2)]);
    assert_eq!(current, labels(&["X", "X", "X"]));
}

#[test]
fn test_single_pass_is_order_dependent() {
    let mut current = labels(&["", "", "X"]);
    let outcome = propagate_labels(
        &mut current,
        &[pair(0, 1), pair(1, 2)],
        PropagationMode::SinglePass,
    );

    assert_eq!(current, labels(&["", "X", "X"]));
    assert_eq!(outcome.passes, 1);
    assert_eq!(outcome.labels_changed, 1);
}

#[test]
fn test_closure_reaches_fixed_point() {
    let mut current = labels(&["", "", "X"]);
    let outcome = propagate_labels(
        &mut current,
        &[pair(0, 1), pair(1, 2)],
        PropagationMode::Closure,
    );

    assert_eq!(current, labels(&["X", "X", "X"]));
    assert_eq!(outcome.passes, 3);
    assert_eq!(outcome.labels_changed, 2);
}

#[test]
fn test_no_op_when_emptiness_matches() {
    let pairs = [pair(0, 1), pair(1, 2), pair(0, 2)];

    let mut all_empty = labels(&["", "", ""]);
    let outcome = propagate_labels(&mut all_empty, &pairs, PropagationMode::Closure);
    assert_eq!(outcome.labels_changed, 0);
    assert_eq!(all_empty, labels(&["", "", ""]));

    let mut all_set = labels(&["X", "Y", "Z"]);
    let outcome = propagate_labels(&mut all_set, &pairs, PropagationMode::SinglePass);
    assert_eq!(outcome.labels_changed, 0);
    assert_eq!(all_set, labels(&["X", "Y", "Z"]));
}

#[test]
fn test_no_pairs_means_no_passes() {
    let mut current = labels(&["X", ""]);
    let outcome = propagate_labels(&mut current, &[], PropagationMode::Closure);
    assert_eq!(outcome.passes, 0);
}
