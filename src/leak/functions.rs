//! The impls and functions
//!
use std::{sync::{Arc, PoisonError}, time::{SystemTime, UNIX_EPOCH}};
use log::*;
use crate::census::LiveRegistry;
use crate::leak::{LeakBuffer, Leaker};

/// The most leakers added by a single drip.
pub const MAX_DRIP: usize = 1000;

impl LeakBuffer {
    pub fn new() -> Self { Default::default() }
    /// Append `count` new leakers to the buffer, and track them in `registry`.
    pub fn drip(
        &self,
        registry: &LiveRegistry,
        count: usize,
    )
    {
        let mut leaked = self.leaked.lock().unwrap_or_else(PoisonError::into_inner);
        for _ in 0..count
        {
            let leaker = Arc::new(Leaker);
            registry.track(&leaker);
            leaked.push(leaker);
        }
        debug!("leaked {} leakers, {} in total", count, leaked.len());
    }
    pub fn len(&self) -> usize {
        self.leaked.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// A number between 0 and [MAX_DRIP], both included.
///
/// This doesn't need to be a good random number, it only makes the leak irregular.
pub fn drip_count() -> usize
{
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.subsec_nanos())
        .unwrap_or_default() as usize;
    // spread the low bits, the nanosecond clock can be coarse.
    nanos.wrapping_mul(2654435761) % (MAX_DRIP + 1)
}
