//! Module for the leak demo.
//!
//! Every request to `/` appends a random number of [Leaker] values to a buffer that is never emptied.
//! The values are tracked in the census registry, so the leak shows up on `/growth`.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
