//! Display model implementations for table and JSON output
//!
//! Display models transform service results into CLI-friendly formats
//! with appropriate column names and serialization.

mod followers;
mod metrics;
mod token;

pub use followers::FollowerDisplay;
pub use metrics::MetricsDisplay;
pub(crate) use metrics::followers_label;
pub use token::SearchResultDisplay;
