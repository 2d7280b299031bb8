//! growthz shows which types of objects grew in a running process, per observer.
//!
//! The `/growth` endpoint takes a census of live objects per type, and compares it with the highest
//! counts the calling observer has seen before. Only growth beyond these peaks is shown, so every
//! observer sees what grew since its own previous visit.
//!
#[macro_use]
extern crate serde_derive;

pub mod growth;
pub mod census;
pub mod session;
pub mod observer;
pub mod leak;
pub mod server;
pub mod watch;
pub mod utility;

/// The address the server listens on when nothing is set.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:5000";
/// Seconds between polls in watch mode.
pub const DEFAULT_INTERVAL: u64 = 5;
pub const HTTP_TIMEOUT_SECONDS: u64 = 10;
