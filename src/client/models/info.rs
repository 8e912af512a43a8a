//! Token metadata models (info endpoint)

use serde::{Deserialize, Serialize};

/// Token metadata: logo, project links, social handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub symbol: String,

    /// Hosted logo URL
    #[serde(default)]
    pub logo: Option<String>,

    /// X/Twitter handle without the leading `@`
    #[serde(default)]
    pub twitter_username: Option<String>,

    #[serde(default)]
    pub urls: ProjectUrls,
}

/// Project links grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUrls {
    #[serde(default)]
    pub website: Vec<String>,
    #[serde(default)]
    pub twitter: Vec<String>,
    #[serde(default)]
    pub chat: Vec<String>,
    #[serde(default)]
    pub reddit: Vec<String>,
    #[serde(default)]
    pub source_code: Vec<String>,
}

impl TokenInfo {
    /// Social handle for enrichment.
    ///
    /// Prefers the explicit `twitter_username`; otherwise derives it from the
    /// first twitter URL.
    pub fn handle(&self) -> Option<String> {
        self.twitter_username
            .as_deref()
            .map(|h| h.trim().trim_start_matches('@'))
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .or_else(|| self.urls.twitter.iter().find_map(|u| handle_from_url(u)))
    }

    /// First chat link pointing at Telegram
    pub fn telegram(&self) -> Option<&str> {
        self.urls
            .chat
            .iter()
            .find(|u| u.contains("t.me"))
            .map(String::as_str)
    }
}

/// Extract a handle from a `twitter.com/<handle>` or `x.com/<handle>` URL.
pub fn handle_from_url(url: &str) -> Option<String> {
    let rest = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_start_matches("mobile.");

    let path = rest
        .strip_prefix("twitter.com/")
        .or_else(|| rest.strip_prefix("x.com/"))?;

    let handle = path
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('@');

    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}
