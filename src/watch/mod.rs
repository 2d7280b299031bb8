//! Module for ad-hoc watching of the growth of another process.
//!
//! The `/typestats` endpoint of the process is read every interval, and the growth against the peaks
//! seen so far is printed. The peaks are only kept in memory for the duration of the watch.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
