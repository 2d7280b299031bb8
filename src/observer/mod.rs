//! Module for observing growth on behalf of a single observer.
//!
//! An observation is: take a census, load the peaks of the observer, calculate the growth, save the new peaks.
//!
mod structs;
mod functions;

pub use structs::*;
