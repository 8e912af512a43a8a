//! Mock market data client for testing
//!
//! Provides a mock implementation of [`MarketDataApi`] for unit testing
//! without making real API calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::models::{Token, TokenInfo};
use super::{MarketDataApi, PageRequest};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure the catalog and metadata via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockMarketDataClient::new()
///     .with_catalog(vec![Token::new(1, "BTC", "Bitcoin")]);
///
/// let page = mock.list_tokens(PageRequest::new(1, 5000)).await?;
/// assert_eq!(page.len(), 1);
/// ```
#[derive(Default)]
pub struct MockMarketDataClient {
    /// Full catalog, sliced by page requests
    catalog: Arc<Mutex<Vec<Token>>>,
    /// Metadata returned from info
    info: Arc<Mutex<HashMap<u64, TokenInfo>>>,
    /// Error returned by the next listing call (consumed on use)
    listing_error: Arc<Mutex<Option<ApiError>>>,
    /// Error returned by every quotes call
    quotes_error: Arc<Mutex<Option<String>>>,
    /// Artificial latency per page start offset
    page_delays: Arc<Mutex<HashMap<usize, Duration>>>,
    /// Number of list_tokens calls
    listing_calls: AtomicUsize,
    /// Number of quotes calls
    quotes_calls: AtomicUsize,
}

impl MockMarketDataClient {
    /// Create a new empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full catalog
    pub fn with_catalog(self, tokens: Vec<Token>) -> Self {
        *self.catalog.try_lock().expect("mock not shared yet") = tokens;
        self
    }

    /// Add metadata for a token
    pub fn with_info(self, info: TokenInfo) -> Self {
        self.info
            .try_lock()
            .expect("mock not shared yet")
            .insert(info.id, info);
        self
    }

    /// Delay responses for the page starting at `start`
    pub fn with_page_delay(self, start: usize, delay: Duration) -> Self {
        self.page_delays
            .try_lock()
            .expect("mock not shared yet")
            .insert(start, delay);
        self
    }

    /// Replace the catalog (simulates the provider changing between refreshes)
    pub async fn set_catalog(&self, tokens: Vec<Token>) {
        *self.catalog.lock().await = tokens;
    }

    /// Fail the next listing call with the given error
    pub async fn fail_next_listing(&self, err: ApiError) {
        *self.listing_error.lock().await = Some(err);
    }

    /// Fail all quotes calls with a server error
    pub async fn fail_quotes(&self, msg: &str) {
        *self.quotes_error.lock().await = Some(msg.to_string());
    }

    /// Number of list_tokens calls made so far
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Number of quotes calls made so far
    pub fn quotes_calls(&self) -> usize {
        self.quotes_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataApi for MockMarketDataClient {
    async fn list_tokens(&self, page: PageRequest) -> Result<Vec<Token>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.page_delays.lock().await.get(&page.start).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.listing_error.lock().await.take() {
            return Err(err.into());
        }

        let catalog = self.catalog.lock().await;
        Ok(catalog
            .iter()
            .skip(page.start.saturating_sub(1))
            .take(page.limit)
            .cloned()
            .collect())
    }

    async fn quotes(&self, ids: &[u64]) -> Result<HashMap<u64, Token>> {
        self.quotes_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(msg) = self.quotes_error.lock().await.clone() {
            return Err(ApiError::ServerError(msg).into());
        }

        let catalog = self.catalog.lock().await;
        Ok(catalog
            .iter()
            .filter(|t| ids.contains(&t.id))
            .map(|t| (t.id, t.clone()))
            .collect())
    }

    async fn info(&self, ids: &[u64]) -> Result<HashMap<u64, TokenInfo>> {
        let info = self.info.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| info.get(id).map(|i| (*id, i.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_slices_pages() {
        let tokens = (1..=5).map(|i| Token::new(i, format!("T{}", i), format!("Token {}", i)));
        let mock = MockMarketDataClient::new().with_catalog(tokens.collect());

        let first = mock.list_tokens(PageRequest::new(1, 3)).await.unwrap();
        let second = mock.list_tokens(PageRequest::new(4, 3)).await.unwrap();

        assert_eq!(first.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(second.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(mock.listing_calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_listing_error_is_consumed() {
        let mock = MockMarketDataClient::new().with_catalog(vec![Token::new(1, "BTC", "Bitcoin")]);
        mock.fail_next_listing(ApiError::ServerError("boom".into())).await;

        assert!(mock.list_tokens(PageRequest::new(1, 10)).await.is_err());
        assert!(mock.list_tokens(PageRequest::new(1, 10)).await.is_ok());
    }
}
