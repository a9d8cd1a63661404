//! Fuzzy comparison of canonical addresses
//!
//! Scores follow the classic Levenshtein "ratio": the edit distance counts
//! insertions and deletions only (a substitution costs two), and the score is
//! `(lensum - distance) / lensum * 100`, rounded half-to-even on a 0-100 scale.
//! Lengths are counted in Unicode scalar values. Equal strings score 100,
//! two empty strings included; a single empty operand scores 0.

use crate::constants::DEFAULT_SIMILARITY_THRESHOLD;

/// Insert/delete edit distance between two character sequences
///
/// Computed as `len(a) + len(b) - 2 * lcs(a, b)` with a two-row table.
pub fn indel_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return a.len() + b.len();
    }

    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    a.len() + b.len() - 2 * previous[b.len()]
}

fn ratio_to_score(kept: usize, lensum: usize) -> u8 {
    let ratio = kept as f64 / lensum as f64;
    (ratio * 100.0).round_ties_even() as u8
}

/// Similarity score (0-100) between two strings
pub fn similarity_score(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    score_chars(&a, &b)
}

fn score_chars(a: &[char], b: &[char]) -> u8 {
    if a == b {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let lensum = a.len() + b.len();
    ratio_to_score(lensum - indel_distance(a, b), lensum)
}

/// Highest score two strings of these lengths could reach
///
/// The distance is at least the length difference, so the score is bounded
/// by `2 * min(len) / lensum`. Pairs whose bound is below the threshold can
/// be skipped without changing any result.
pub fn max_possible_score(len_a: usize, len_b: usize) -> u8 {
    if len_a == 0 && len_b == 0 {
        return 100;
    }
    if len_a == 0 || len_b == 0 {
        return 0;
    }
    ratio_to_score(2 * len_a.min(len_b), len_a + len_b)
}

/// Whether two canonical addresses score at or above `threshold`
pub fn is_address_similar(a: &str, b: &str, threshold: u8) -> bool {
    similarity_score(a, b) >= threshold
}

/// Threshold-bound matcher over pre-split addresses
///
/// Callers comparing many pairs split each address into characters once and
/// reuse the buffers.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityMatcher {
    threshold: u8,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl SimilarityMatcher {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether two addresses are similar at this matcher's threshold
    pub fn similar(&self, a: &str, b: &str) -> bool {
        is_address_similar(a, b, self.threshold)
    }

    /// Whether the length bound already rules the pair out
    pub fn rules_out(&self, len_a: usize, len_b: usize) -> bool {
        max_possible_score(len_a, len_b) < self.threshold
    }

    /// Compare pre-split addresses
    pub fn similar_chars(&self, a: &[char], b: &[char]) -> bool {
        score_chars(a, b) >= self.threshold
    }
}
