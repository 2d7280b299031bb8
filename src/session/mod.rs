//! Module for storing the peak table of every observer.
//!
//! An observer is a single client of the `/growth` endpoint, identified by its session cookie.
//! The store itself is behind the [SessionStore] trait:
//! - [MemorySessionStore] keeps the tables in memory.
//! - [FileSessionStore] keeps a json file per observer in a directory.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
