//! The structs
//!
use std::sync::Arc;
use crate::census::LiveRegistry;
use crate::leak::LeakBuffer;
use crate::observer::GrowthObserver;

/// Everything the routes share.
pub struct ServerState {
    pub observer: GrowthObserver,
    pub registry: Arc<LiveRegistry>,
    pub leaks: LeakBuffer,
}
/// Query string of `/growth`.
#[derive(Deserialize, Debug, Default)]
pub struct GrowthQuery {
    /// `json` for a json array, anything else gives html.
    pub format: Option<String>,
    /// Only show types matching this regex.
    #[serde(rename = "match")]
    pub type_name_match: Option<String>,
}
