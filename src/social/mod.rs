//! Social follower lookups
//!
//! Follower counts come from an ordered chain of sources behind the
//! follower cache: the official API first, then an external scrape service.
//! Every source answers with a [`FollowerLookup`] so the chain can tell
//! "zero followers" apart from "could not find out".

pub mod enrich;
pub mod scraper;
pub mod twitter;

use async_trait::async_trait;

use crate::error::Result;

pub use enrich::Enricher;
pub use scraper::ScrapeServiceSource;
pub use twitter::TwitterApiSource;

/// Result of one source lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerLookup {
    /// Definitive follower count
    Count(u64),
    /// Account is suspended
    Suspended,
    /// Source could not determine the count; try the next one
    Unknown,
}

impl FollowerLookup {
    /// Whether the chain should stop here
    pub fn is_definitive(&self) -> bool {
        !matches!(self, FollowerLookup::Unknown)
    }
}

/// One follower strategy in the fallback chain
#[async_trait]
pub trait FollowerSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn lookup(&self, handle: &str) -> Result<FollowerLookup>;
}

/// Parse a displayed follower count such as `"12,345"`, `"1.2K"` or
/// `"3.4M Followers"`.
///
/// Returns 0 when no number is present.
pub fn parse_followers_count(text: &str) -> u64 {
    let text = text.trim();
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return 0;
    };

    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.'))
        .unwrap_or(rest.len());

    let digits: String = rest[..end].chars().filter(|c| *c != ',').collect();
    let Ok(num) = digits.parse::<f64>() else {
        return 0;
    };

    let multiplier = match rest[end..].trim_start().chars().next() {
        Some('k' | 'K') => 1_000.0,
        Some('m' | 'M') => 1_000_000.0,
        Some('b' | 'B') => 1_000_000_000.0,
        _ => 1.0,
    };

    (num * multiplier).round() as u64
}
