//! Display models for CLI output
//!
//! Converts service types into CLI-friendly rows.

pub mod display;

pub use display::{FollowerDisplay, MetricsDisplay, SearchResultDisplay};
pub(crate) use display::followers_label;
