//! Module for calculating the growth of live object counts per type.
//!
//! Every observer has its own peak table: the highest count it has seen for every type.
//! A new census is compared with the peak table, and only counts that exceed the peak are reported.
//! This means an observer sees the growth since its previous look, not since process start.
//!
//! Nothing in here performs I/O. Reading the census and storing the peaks is done by the caller.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
