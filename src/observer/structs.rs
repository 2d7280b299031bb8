//! The structs
//!
use std::sync::Arc;
use crate::census::CensusProvider;
use crate::session::{ObserverLocks, SessionStore};

/// Ties a census provider and a session store together for calculating growth per observer.
pub struct GrowthObserver {
    pub census: Arc<dyn CensusProvider>,
    pub store: Arc<dyn SessionStore>,
    pub(crate) locks: ObserverLocks,
}
