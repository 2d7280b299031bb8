//! The structs
//!
use std::{collections::HashMap, path::PathBuf, sync::{Arc, Mutex}};
use anyhow::Result;
use crate::growth::PeakTable;

/// Per observer storage of peak tables.
///
/// A saved peak table must be returned by the next load for the same observer,
/// and observers never see each other's tables.
/// Loads and saves are separate calls, so two concurrent load-save cycles for one observer
/// end with whichever save came last.
pub trait SessionStore: Send + Sync {
    /// The peaks of `observer_id`, or an empty table for an observer that has none yet.
    fn load_peaks(&self, observer_id: &str) -> Result<PeakTable>;
    fn save_peaks(&self, observer_id: &str, peaks: PeakTable) -> Result<()>;
}
/// Peak tables kept in memory, lost at process exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    pub(crate) sessions: Mutex<HashMap<String, PeakTable>>,
}
/// Peak tables stored as `<directory>/<observer_id>.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    pub directory: PathBuf,
}
/// One async lock per observer.
///
/// Holding an observer's lock across load, compute and save makes the updates of that observer sequential.
/// An observer's entry is removed when the last guard for it is dropped and nobody waits for it.
#[derive(Debug, Default)]
pub struct ObserverLocks {
    pub(crate) locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}
/// Held lock of one observer, see [ObserverLocks::lock].
#[derive(Debug)]
pub struct ObserverGuard<'a> {
    pub(crate) locks: &'a ObserverLocks,
    pub(crate) observer_id: String,
    pub(crate) guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}
