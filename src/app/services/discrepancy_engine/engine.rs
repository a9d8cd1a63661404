//! Discrepancy engine orchestration
//!
//! Runs normalization, grouping, classification and similarity propagation
//! over one in-memory batch of records.

use crate::{Error, Result};
use crate::app::models::{AddressRecord, AnalyzedRecord};
use crate::app::services::similarity::SimilarityMatcher;
use crate::config::{MatchingConfig, PropagationMode};
use indicatif::ProgressBar;
use tracing::{debug, info};

use super::{
    aggregation::{
        AddressGroup, attach_gln_address_counts, normalize_records, summarize_address_groups,
    },
    classifier::classify,
    propagation::{find_similar_pairs, propagate_labels},
    stats::{EngineResult, EngineStats},
};

/// Discrepancy detection over a batch of account records
///
/// The engine is synchronous and holds no connection or state between runs;
/// every derived value is recomputed from the batch it is given.
///
/// # Example
///
/// ```rust
/// use gln_recon::{AddressRecord, DiscrepancyEngine};
///
/// let records = vec![
///     AddressRecord::new("1001", "A", "123 Main St"),
///     AddressRecord::new("1002", "B", "123 Main Street"),
/// ];
///
/// let result = DiscrepancyEngine::default().process(records).unwrap();
/// assert_eq!(result.records[0].normalized_address, "123 MAIN");
/// assert_eq!(result.records[1].discrepancy, "Multiple SHIP_TO_GLN per Address");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiscrepancyEngine {
    matching: MatchingConfig,
}

impl DiscrepancyEngine {
    /// Create an engine from matching configuration
    pub fn new(matching: &MatchingConfig) -> Self {
        Self {
            matching: matching.clone(),
        }
    }

    /// Use a custom similarity threshold
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.matching.similarity_threshold = threshold;
        self
    }

    /// Use a custom propagation mode
    pub fn with_mode(mut self, mode: PropagationMode) -> Self {
        self.matching.propagation_mode = mode;
        self
    }

    /// Reject batches with more distinct addresses than `max` (0 = unlimited)
    pub fn with_max_similarity_addresses(mut self, max: usize) -> Self {
        self.matching.max_similarity_addresses = max;
        self
    }

    pub fn matching_config(&self) -> &MatchingConfig {
        &self.matching
    }

    /// Annotate a batch of records with normalized addresses and discrepancy labels
    ///
    /// # Arguments
    ///
    /// * `records` - Input records; output order equals input order
    ///
    /// # Returns
    ///
    /// An `EngineResult` with the analyzed records and run statistics, a
    /// validation error for the first record missing its account id or GLN,
    /// or `SimilarityLimitExceeded` when a non-zero address ceiling is exceeded
    pub fn process(&self, records: Vec<AddressRecord>) -> Result<EngineResult> {
        self.process_with_progress(records, None)
    }

    /// Same as [`process`](Self::process), advancing `progress_bar` during the pair pass
    ///
    /// The bar's length is set to the number of distinct addresses.
    pub fn process_with_progress(
        &self,
        records: Vec<AddressRecord>,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<EngineResult> {
        for (index, record) in records.iter().enumerate() {
            record.validate(index + 1)?;
        }

        let mut stats = EngineStats::new();
        stats.input_rows = records.len();
        info!("Analyzing {} records", records.len());

        // Step 1-3: Normalize and attach per-GLN address counts
        let mut analyzed = normalize_records(records);
        stats.distinct_glns = attach_gln_address_counts(&mut analyzed);

        // Step 4-5: Group by normalized address and classify each group
        let groups = summarize_address_groups(&analyzed);
        stats.distinct_addresses = groups.len();
        let mut labels: Vec<String> = groups
            .iter()
            .map(|group| classify(group.first_unique_addresses_for_gln, group.distinct_glns))
            .collect();

        // Step 6: Similarity propagation
        self.propagate(&groups, &mut labels, &mut stats, progress_bar)?;

        broadcast_labels(&mut analyzed, &groups, labels);
        stats.record_labels(&analyzed);

        info!("{}", stats.summary());
        Ok(EngineResult::new(analyzed, stats))
    }

    fn propagate(
        &self,
        groups: &[AddressGroup],
        labels: &mut [String],
        stats: &mut EngineStats,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<()> {
        let ceiling = self.matching.max_similarity_addresses;
        if ceiling > 0 && groups.len() > ceiling {
            return Err(Error::similarity_limit_exceeded(groups.len(), ceiling));
        }

        if let Some(pb) = progress_bar {
            pb.set_length(groups.len() as u64);
            pb.set_message("Comparing addresses");
        }

        let addresses: Vec<&str> = groups
            .iter()
            .map(|group| group.normalized_address.as_str())
            .collect();
        let matcher = SimilarityMatcher::new(self.matching.similarity_threshold);
        let pairs = find_similar_pairs(&addresses, &matcher, stats, progress_bar);

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("{} similar address pairs", pairs.len()));
        }

        let outcome = propagate_labels(labels, &pairs, self.matching.propagation_mode);
        stats.propagation_passes = outcome.passes;
        stats.labels_propagated = outcome.labels_changed;
        debug!(
            "Propagation filled {} labels in {} passes",
            outcome.labels_changed, outcome.passes
        );
        Ok(())
    }
}

/// Copy each group's final label onto all of its records
fn broadcast_labels(records: &mut [AnalyzedRecord], groups: &[AddressGroup], labels: Vec<String>) {
    for (group, label) in groups.iter().zip(labels) {
        for &row in &group.rows {
            records[row].discrepancy = label.clone();
        }
    }
}
