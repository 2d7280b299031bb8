//! Module for taking a census of live objects per type.
//!
//! Rust has no garbage collector to ask for object counts, so values have to be registered.
//! The [LiveRegistry] keeps a weak reference for every tracked value, grouped by type name.
//! A census counts the weak references per type after collecting the ones that point to dropped values.
//!
//! [RemoteCensus] reads the census of another growthz process over HTTP, via its `/typestats` endpoint.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
