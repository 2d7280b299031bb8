//! Module for the http endpoint.
//!
//! The routes are built with warp. An observer is identified by the `growthz_session` cookie,
//! which is handed out on the first visit of `/growth`.
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
