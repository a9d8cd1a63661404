//! Engine statistics and result structures

use crate::app::models::AnalyzedRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics for one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Number of input records
    pub input_rows: usize,
    /// Distinct normalized addresses
    pub distinct_addresses: usize,
    /// Distinct GLNs
    pub distinct_glns: usize,
    /// Records carrying a non-empty label after propagation
    pub flagged_rows: usize,
    /// Address pairs scored by the similarity matcher
    pub pairs_compared: usize,
    /// Address pairs ruled out by the length bound without scoring
    pub pairs_skipped_by_length: usize,
    /// Address pairs at or above the similarity threshold
    pub similar_pairs: usize,
    /// Address groups whose label was filled by propagation
    pub labels_propagated: usize,
    /// Propagation passes over the similar pairs
    pub propagation_passes: usize,
    /// Records per non-empty label
    pub label_counts: BTreeMap<String, usize>,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of input records carrying a discrepancy
    pub fn flagged_rate(&self) -> f64 {
        if self.input_rows == 0 {
            0.0
        } else {
            (self.flagged_rows as f64 / self.input_rows as f64) * 100.0
        }
    }

    /// Recount flagged rows and rows per label from the final records
    pub fn record_labels(&mut self, records: &[AnalyzedRecord]) {
        self.flagged_rows = 0;
        self.label_counts.clear();
        for analyzed in records.iter().filter(|r| r.has_discrepancy()) {
            self.flagged_rows += 1;
            *self
                .label_counts
                .entry(analyzed.discrepancy.clone())
                .or_insert(0) += 1;
        }
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Discrepancy analysis: {} rows, {} addresses, {} GLNs | \
             Flagged: {} ({:.1}%) | Similar pairs: {} of {} compared | Propagated: {}",
            self.input_rows,
            self.distinct_addresses,
            self.distinct_glns,
            self.flagged_rows,
            self.flagged_rate(),
            self.similar_pairs,
            self.pairs_compared,
            self.labels_propagated
        )
    }
}

/// Annotated records and statistics of one engine run
#[derive(Debug, Clone)]
pub struct EngineResult {
    /// Analyzed records, in input order
    pub records: Vec<AnalyzedRecord>,
    pub stats: EngineStats,
}

impl EngineResult {
    pub fn new(records: Vec<AnalyzedRecord>, stats: EngineStats) -> Self {
        Self { records, stats }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Records carrying a non-empty discrepancy label
    pub fn flagged(&self) -> impl Iterator<Item = &AnalyzedRecord> {
        self.records.iter().filter(|r| r.has_discrepancy())
    }

    pub fn summary(&self) -> String {
        self.stats.summary()
    }
}
