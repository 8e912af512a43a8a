//! Market data API client

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod coinmarketcap;
pub mod models;
pub mod pagination;
pub mod parallel;

#[cfg(test)]
pub use mock::MockMarketDataClient;
pub use coinmarketcap::CoinMarketCapClient;
pub use models::{Token, TokenInfo};
pub use pagination::{CATALOG_PAGE_COUNT, MAX_PAGE_SIZE, PageRequest, catalog_pages};
pub use parallel::fetch_pages_ordered;

/// Market data provider API.
///
/// Implemented by the live CoinMarketCap client and by the test mock.
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    /// Fetch one page of the full token listing, ordered by rank.
    async fn list_tokens(&self, page: PageRequest) -> Result<Vec<Token>>;

    /// Latest quotes for the given ids, keyed by id.
    ///
    /// Ids unknown to the provider are absent from the map.
    async fn quotes(&self, ids: &[u64]) -> Result<HashMap<u64, Token>>;

    /// Metadata (logo, links, social handle) for the given ids, keyed by id.
    async fn info(&self, ids: &[u64]) -> Result<HashMap<u64, TokenInfo>>;
}
