//! CoinMarketCap API client implementation

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::models::{Envelope, Token, TokenInfo};
use super::{MarketDataApi, PageRequest};
use crate::config::DEFAULT_API_HOST;
use crate::error::{ApiError, ConfigError, Result};

/// Header carrying the Pro API key
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

const LISTINGS_PATH: &str = "/v1/cryptocurrency/listings/latest";
const QUOTES_PATH: &str = "/v2/cryptocurrency/quotes/latest";
const INFO_PATH: &str = "/v2/cryptocurrency/info";

/// Id-keyed endpoints return a single object per key, symbol-keyed ones an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.into_iter().next(),
        }
    }
}

/// CoinMarketCap Pro API client
pub struct CoinMarketCapClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl CoinMarketCapClient {
    /// Create a new client against the public API host
    pub fn new(api_key: Option<String>, rate_per_second: u32) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_API_HOST, rate_per_second)
    }

    /// Create a new client against a custom host (used for testing)
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: &str,
        rate_per_second: u32,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(rate_per_second).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            rate_limiter,
        })
    }

    /// Make an authenticated GET request and unwrap the `data` envelope
    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let api_key = self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;

        // Apply rate limiting
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let envelope = response.json::<Envelope<T>>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                if envelope.status.error_code != 0 {
                    let msg = envelope
                        .status
                        .error_message
                        .unwrap_or_else(|| format!("error code {}", envelope.status.error_code));
                    return Err(ApiError::BadRequest(msg).into());
                }
                Ok(envelope.data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }

    /// Fetch an id-keyed map endpoint (quotes, info)
    async fn get_by_ids<T, F>(&self, path: &str, ids: &[u64], id_of: F) -> Result<HashMap<u64, T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> u64,
    {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let id_list = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let data: Option<HashMap<String, OneOrMany<T>>> =
            self.get_data(path, &[("id", id_list)]).await?;

        Ok(data
            .unwrap_or_default()
            .into_values()
            .filter_map(OneOrMany::into_first)
            .map(|item| (id_of(&item), item))
            .collect())
    }
}

#[async_trait]
impl MarketDataApi for CoinMarketCapClient {
    async fn list_tokens(&self, page: PageRequest) -> Result<Vec<Token>> {
        log::debug!(
            "Fetching tokens from {} to {}",
            page.start,
            page.start + page.limit - 1
        );
        let tokens: Option<Vec<Token>> = self
            .get_data(LISTINGS_PATH, &page.to_query_params())
            .await?;
        Ok(tokens.unwrap_or_default())
    }

    async fn quotes(&self, ids: &[u64]) -> Result<HashMap<u64, Token>> {
        self.get_by_ids(QUOTES_PATH, ids, |t: &Token| t.id).await
    }

    async fn info(&self, ids: &[u64]) -> Result<HashMap<u64, TokenInfo>> {
        self.get_by_ids(INFO_PATH, ids, |i: &TokenInfo| i.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> CoinMarketCapClient {
        CoinMarketCapClient::with_base_url(Some("test-key".to_string()), &server.url(), 100)
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = CoinMarketCapClient::new(Some("test_key".to_string()), 5);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_list_tokens_sends_key_and_paging() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", LISTINGS_PATH)
            .match_header(API_KEY_HEADER, "test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), "5001".into()),
                Matcher::UrlEncoded("limit".into(), "5000".into()),
                Matcher::UrlEncoded("convert".into(), "USD".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status": {"error_code": 0, "error_message": null},
                    "data": [{"id": 1, "name": "Bitcoin", "symbol": "BTC", "cmc_rank": 1}]}"#,
            )
            .create_async()
            .await;

        let tokens = client_for(&server)
            .list_tokens(PageRequest::new(5001, 5000))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "BTC");
    }

    #[tokio::test]
    async fn test_list_tokens_missing_data_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", LISTINGS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status": {"error_code": 0}}"#)
            .create_async()
            .await;

        let tokens = client_for(&server)
            .list_tokens(PageRequest::new(1, 10))
            .await
            .unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", LISTINGS_PATH)
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let err = client_for(&server)
            .list_tokens(PageRequest::new(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::ServerError(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", LISTINGS_PATH)
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "12")
            .create_async()
            .await;

        let err = client_for(&server)
            .list_tokens(PageRequest::new(1, 10))
            .await
            .unwrap_err();
        match err {
            Error::Api(ApiError::RateLimit(d)) => assert_eq!(d, Duration::from_secs(12)),
            other => panic!("Expected rate limit error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", LISTINGS_PATH)
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server)
            .list_tokens(PageRequest::new(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", LISTINGS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client_for(&server)
            .list_tokens(PageRequest::new(1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let client =
            CoinMarketCapClient::with_base_url(None, "http://127.0.0.1:9", 100).unwrap();
        let err = client.list_tokens(PageRequest::new(1, 10)).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_quotes_keyed_by_id() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", QUOTES_PATH)
            .match_query(Matcher::UrlEncoded("id".into(), "1,1027".into()))
            .with_status(200)
            .with_body(
                r#"{"status": {"error_code": 0}, "data": {
                    "1": {"id": 1, "name": "Bitcoin", "symbol": "BTC",
                          "quote": {"USD": {"price": 65000.0}}},
                    "1027": {"id": 1027, "name": "Ethereum", "symbol": "ETH",
                          "quote": {"USD": {"price": 3000.0}}}
                }}"#,
            )
            .create_async()
            .await;

        let quotes = client_for(&server).quotes(&[1, 1027]).await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[&1027].quote.usd.price, Some(3000.0));
    }

    #[tokio::test]
    async fn test_info_accepts_array_values() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", INFO_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"status": {"error_code": 0}, "data": {
                    "BTC": [{"id": 1, "name": "Bitcoin", "symbol": "BTC",
                             "twitter_username": "bitcoin",
                             "urls": {"website": ["https://bitcoin.org"]}}]
                }}"#,
            )
            .create_async()
            .await;

        let info = client_for(&server).info(&[1]).await.unwrap();
        assert_eq!(info[&1].twitter_username.as_deref(), Some("bitcoin"));
        assert_eq!(info[&1].urls.website, vec!["https://bitcoin.org"]);
    }

    #[tokio::test]
    async fn test_empty_ids_skip_request() {
        let server = mockito::Server::new_async().await;
        let quotes = client_for(&server).quotes(&[]).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_envelope_error_code() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", QUOTES_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status": {"error_code": 400, "error_message": "Invalid value for \"id\""}}"#)
            .create_async()
            .await;

        let err = client_for(&server).quotes(&[999_999]).await.unwrap_err();
        match err {
            Error::Api(ApiError::BadRequest(msg)) => assert!(msg.contains("Invalid value")),
            other => panic!("Expected bad request, got {:?}", other),
        }
    }
}
