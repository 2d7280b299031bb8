//! The structs
//!
use std::sync::Arc;
use crate::census::CensusProvider;
use crate::growth::PeakTable;

/// A watcher with its own peak table, it acts as a single observer.
pub struct GrowthWatch {
    pub census: Arc<dyn CensusProvider>,
    pub peaks: PeakTable,
    /// The number of polls done.
    pub polls: u64,
}
