//! The structs
//!
use std::sync::{Arc, Mutex};
/// The value that gets leaked. It holds nothing, it only has to exist.
#[derive(Debug, Default)]
pub struct Leaker;
/// Append-only buffer of leaked values, owned by the leak route.
///
/// The growth calculation never reads this, it only sees the leakers through the census.
#[derive(Debug, Default)]
pub struct LeakBuffer {
    pub(crate) leaked: Mutex<Vec<Arc<Leaker>>>,
}
