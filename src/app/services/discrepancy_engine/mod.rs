//! Discrepancy detection between GLNs and normalized addresses
//!
//! This module is the core of the reconciler. Given a batch of account
//! records it attaches a canonical address to each record and labels every
//! normalized-address group with the kinds of GLN/address mismatch it shows.
//!
//! # Architecture
//!
//! - [`aggregation`] - Normalization, per-GLN address counts and address groups
//! - [`classifier`] - Label construction from a group's counts
//! - [`propagation`] - Pairwise similarity and label copying between groups
//! - [`engine`] - The `DiscrepancyEngine` orchestrating the stages
//! - [`stats`] - Run statistics and result structures
//!
//! # Pipeline
//!
//! 1. **Normalize** every delivery address
//! 2. **Count** distinct normalized addresses per GLN and attach the count to each record
//! 3. **Group** by normalized address, counting distinct GLNs per group
//! 4. **Classify** each group from its first record's per-GLN count and its GLN count
//! 5. **Propagate** labels from labelled groups to similar unlabelled ones
//!
//! The group label is taken from the count of the group's *first* record, so
//! a group whose later records belong to a multi-address GLN is not flagged
//! by that rule. This is the established behavior and is kept as is.

pub mod aggregation;
pub mod classifier;
pub mod engine;
pub mod propagation;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use classifier::{DiscrepancyKind, classify};
pub use engine::DiscrepancyEngine;
pub use propagation::{PropagationOutcome, SimilarPair};
pub use stats::{EngineResult, EngineStats};
