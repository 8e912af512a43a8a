//! Official Twitter/X API follower source

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use super::{FollowerLookup, FollowerSource};
use crate::config::DEFAULT_TWITTER_API_HOST;
use crate::error::{ApiError, Result};

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    data: Option<UserData>,
    #[serde(default)]
    errors: Vec<ApiProblem>,
    /// Some gateways report rate limiting in the body with a 200
    #[serde(default)]
    status: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    #[serde(default)]
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    followers_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiProblem {
    #[serde(default)]
    detail: Option<String>,
}

/// Looks up `public_metrics.followers_count` by username.
pub struct TwitterApiSource {
    http: HttpClient,
    base_url: String,
    bearer_token: String,
}

impl TwitterApiSource {
    pub fn new(bearer_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(bearer_token, DEFAULT_TWITTER_API_HOST)
    }

    pub fn with_base_url(bearer_token: impl Into<String>, base_url: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        })
    }
}

#[async_trait]
impl FollowerSource for TwitterApiSource {
    fn name(&self) -> &'static str {
        "twitter-api"
    }

    async fn lookup(&self, handle: &str) -> Result<FollowerLookup> {
        if !is_valid_username(handle) {
            log::warn!("Skipping Twitter API lookup for invalid handle '{}'", handle);
            return Ok(FollowerLookup::Unknown);
        }

        let url = format!("{}/2/users/by/username/{}", self.base_url, handle);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&[("user.fields", "public_metrics")])
            .send()
            .await
            .map_err(ApiError::from)?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                log::info!("Twitter API rate limited, falling back");
                return Ok(FollowerLookup::Unknown);
            }
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized.into()),
            StatusCode::NOT_FOUND => return Err(ApiError::NotFound(handle.to_string()).into()),
            status if status.is_server_error() => {
                let msg = format!("Twitter API returned {}", status);
                return Err(ApiError::ServerError(msg).into());
            }
            status => {
                return Err(
                    ApiError::InvalidResponse(format!("Unexpected status code: {}", status)).into(),
                );
            }
        }

        let body: UserResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(classify(body))
    }
}

/// Usernames are 1-15 of `[A-Za-z0-9_]`, so they are safe as a path segment
fn is_valid_username(handle: &str) -> bool {
    (1..=15).contains(&handle.len())
        && handle.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn classify(body: UserResponse) -> FollowerLookup {
    if body.status == Some(429) {
        log::info!("Twitter API rate limited, falling back");
        return FollowerLookup::Unknown;
    }

    let suspended = body.errors.iter().any(|e| {
        e.detail
            .as_deref()
            .is_some_and(|d| d.to_ascii_lowercase().contains("suspended"))
    });
    if suspended {
        return FollowerLookup::Suspended;
    }

    match body
        .data
        .and_then(|d| d.public_metrics)
        .and_then(|m| m.followers_count)
    {
        Some(count) => FollowerLookup::Count(count),
        None => {
            log::warn!("Twitter API response has no follower count");
            FollowerLookup::Unknown
        }
    }
}
