//! The structs
//!
use std::{any::Any, collections::BTreeMap, sync::{Mutex, Weak}};
use anyhow::Result;
use crate::growth::Census;

/// A source of live instance counts per type.
///
/// `sample_census` is what callers should use: it runs `collect` before taking the counts,
/// so values that are gone but not yet reclaimed are not counted as live.
pub trait CensusProvider: Send + Sync {
    /// Reclaim entries of values that are no longer alive.
    fn collect(&self) {}
    /// The raw counts, without collecting first.
    fn type_stats(&self) -> Result<Census>;
    fn sample_census(&self) -> Result<Census> {
        self.collect();
        self.type_stats()
    }
}
/// In-process registry of tracked values.
///
/// Every tracked value is kept as a weak reference under the name of its type.
/// When a value is dropped, its weak reference stays behind until [CensusProvider::collect] runs.
#[derive(Debug, Default)]
pub struct LiveRegistry {
    pub(crate) entries: Mutex<BTreeMap<&'static str, Vec<Weak<dyn Any + Send + Sync>>>>,
}
/// Census read from the `/typestats` endpoint of another process.
#[derive(Debug, Clone)]
pub struct RemoteCensus {
    pub hostname_port: String,
}
