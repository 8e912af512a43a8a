//! External scrape service follower source
//!
//! Rendering a profile page needs a headless browser, which runs as a
//! separate service. This source calls it over HTTP:
//! `GET {url}?username={handle}` returning `{followers, suspended}`, where
//! `followers` is a number or display text such as `"1.2K"`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use super::{FollowerLookup, FollowerSource, parse_followers_count};
use crate::error::{ApiError, Result};

// Page rendering is slow; allow more than the API timeout
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Followers {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    followers: Option<Followers>,
    #[serde(default)]
    suspended: bool,
}

pub struct ScrapeServiceSource {
    http: HttpClient,
    url: String,
}

impl ScrapeServiceSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(SCRAPE_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FollowerSource for ScrapeServiceSource {
    fn name(&self) -> &'static str {
        "scraper"
    }

    async fn lookup(&self, handle: &str) -> Result<FollowerLookup> {
        log::debug!("Scraping followers for {} via {}", handle, self.url);

        let response = self
            .http
            .get(&self.url)
            .query(&[("username", handle)])
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ServerError(format!("Scrape service returned {}", status)).into());
        }

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if body.suspended {
            return Ok(FollowerLookup::Suspended);
        }

        // The service reports 0 when it could not find the counter
        let count = match body.followers {
            Some(Followers::Number(n)) => n,
            Some(Followers::Text(text)) => parse_followers_count(&text),
            None => 0,
        };

        Ok(if count > 0 {
            FollowerLookup::Count(count)
        } else {
            FollowerLookup::Unknown
        })
    }
}
