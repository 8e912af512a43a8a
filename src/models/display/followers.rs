//! Follower reading display model

use serde::Serialize;
use tabled::Tabled;

use super::metrics::followers_label;
use crate::cache::{FollowerEntry, FollowerReading};
use crate::output::formatters::format_timestamp_ms;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FollowerDisplay {
    #[tabled(rename = "HANDLE")]
    pub handle: String,

    #[tabled(rename = "FOLLOWERS")]
    pub followers: String,

    #[tabled(rename = "SUSPENDED")]
    pub suspended: bool,

    #[tabled(rename = "CACHED AT")]
    pub cached_at: String,
}

impl FollowerDisplay {
    pub fn new(handle: &str, reading: FollowerReading, entry: Option<&FollowerEntry>) -> Self {
        Self {
            handle: handle.to_string(),
            followers: followers_label(reading.count, reading.suspended),
            suspended: reading.suspended,
            cached_at: entry
                .map(|e| format_timestamp_ms(e.timestamp))
                .unwrap_or_else(|| "--".to_string()),
        }
    }
}
