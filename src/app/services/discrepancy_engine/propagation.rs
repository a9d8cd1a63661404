//! Similarity-based label propagation between address groups
//!
//! Distinct normalized addresses are compared pairwise in first-appearance
//! order (`k < m`). Every similar pair may then copy a non-empty label onto
//! the empty side. A single pass is not transitively closed: whether a label
//! reaches a third address depends on pair order. [`PropagationMode::Closure`]
//! repeats passes until nothing changes.

use crate::app::services::similarity::SimilarityMatcher;
use crate::config::PropagationMode;
use indicatif::ProgressBar;
use tracing::debug;

use super::stats::EngineStats;

/// Two similar address groups, by index, with `first < second`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarPair {
    pub first: usize,
    pub second: usize,
}

/// Outcome of label propagation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationOutcome {
    pub passes: usize,
    pub labels_changed: usize,
}

/// Find every similar pair of distinct addresses
///
/// Pairs are returned in discovery order: by `first`, then by `second`.
///
/// # Arguments
///
/// * `addresses` - Distinct normalized addresses in first-appearance order
/// * `matcher` - Threshold-bound similarity matcher
/// * `stats` - Receives compared/skipped/similar pair counts
/// * `progress_bar` - Optional progress bar, advanced once per address
pub fn find_similar_pairs(
    addresses: &[&str],
    matcher: &SimilarityMatcher,
    stats: &mut EngineStats,
    progress_bar: Option<&ProgressBar>,
) -> Vec<SimilarPair> {
    let chars: Vec<Vec<char>> = addresses.iter().map(|a| a.chars().collect()).collect();
    let mut pairs = Vec::new();

    for (first, a) in chars.iter().enumerate() {
        for (offset, b) in chars[first + 1..].iter().enumerate() {
            if matcher.rules_out(a.len(), b.len()) {
                stats.pairs_skipped_by_length += 1;
                continue;
            }
            stats.pairs_compared += 1;
            if matcher.similar_chars(a, b) {
                pairs.push(SimilarPair {
                    first,
                    second: first + 1 + offset,
                });
            }
        }

        if let Some(pb) = progress_bar {
            pb.inc(1);
        }
    }

    stats.similar_pairs = pairs.len();
    debug!(
        "{} similar address pairs ({} compared, {} ruled out by length)",
        pairs.len(),
        stats.pairs_compared,
        stats.pairs_skipped_by_length
    );
    pairs
}

/// Apply one pass of label copying over the pairs, in order
///
/// Each pair reads labels as already updated by earlier pairs.
///
/// # Returns
///
/// Number of labels filled during the pass
pub fn apply_pair_adjustments(labels: &mut [String], pairs: &[SimilarPair]) -> usize {
    let mut changed = 0;
    for pair in pairs {
        let (first, second) = (pair.first, pair.second);
        if labels[second].is_empty() && !labels[first].is_empty() {
            labels[second] = labels[first].clone();
            changed += 1;
        } else if labels[first].is_empty() && !labels[second].is_empty() {
            labels[first] = labels[second].clone();
            changed += 1;
        }
    }
    changed
}

/// Propagate labels across similar pairs according to `mode`
///
/// Closure mode terminates because every change fills an empty label and no
/// label is ever emptied.
pub fn propagate_labels(
    labels: &mut [String],
    pairs: &[SimilarPair],
    mode: PropagationMode,
) -> PropagationOutcome {
    let mut outcome = PropagationOutcome::default();
    if pairs.is_empty() {
        return outcome;
    }

    loop {
        let changed = apply_pair_adjustments(labels, pairs);
        outcome.passes += 1;
        outcome.labels_changed += changed;

        if mode == PropagationMode::SinglePass || changed == 0 {
            break;
        }
        debug!("Propagation pass {} filled {} labels", outcome.passes, changed);
    }

    outcome
}
