//! Token catalog snapshot with TTL refresh
//!
//! The catalog is the full provider listing (two pages of up to 5000 tokens)
//! stored as one snapshot. Readers get the stored snapshot while it is
//! valid; the first reader after expiry refetches it. Refreshes are
//! serialized so concurrent expired reads produce one upstream fetch.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::storage::SnapshotStore;
use super::{Clock, system_clock, ttl_millis};
use crate::client::{
    CATALOG_PAGE_COUNT, MAX_PAGE_SIZE, MarketDataApi, Token, catalog_pages, fetch_pages_ordered,
};
use crate::error::Result;

/// File name of the catalog snapshot inside the cache directory
pub const CATALOG_FILE: &str = "token-list-cache.json";

/// Persisted catalog snapshot.
///
/// Serialized as `{timestamp, expiresIn, tokens}` with millisecond fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    /// Fetch time, epoch ms
    pub timestamp: i64,
    /// Validity window in ms, fixed when the snapshot was written
    pub expires_in: i64,
    /// Tokens in provider rank order
    pub tokens: Vec<Token>,
}

impl CatalogSnapshot {
    /// Valid while strictly less than `expires_in` ms have elapsed.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) < self.expires_in
    }

    /// Expiry time, epoch ms
    pub fn expires_at(&self) -> i64 {
        self.timestamp.saturating_add(self.expires_in)
    }
}

/// Catalog cache summary for status output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    pub last_update: Option<i64>,
    pub expires_at: Option<i64>,
    pub token_count: usize,
    pub valid: bool,
    pub backend: String,
}

/// TTL-cached token catalog
pub struct TokenCatalog {
    api: Arc<dyn MarketDataApi>,
    store: Arc<dyn SnapshotStore<CatalogSnapshot>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    page_size: usize,
    refresh_lock: Mutex<()>,
    // Last fetched snapshot, served when the store could not keep it
    last_fetched: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl TokenCatalog {
    pub fn new(
        api: Arc<dyn MarketDataApi>,
        store: Arc<dyn SnapshotStore<CatalogSnapshot>>,
        ttl: Duration,
    ) -> Self {
        Self {
            api,
            store,
            ttl,
            clock: system_clock(),
            page_size: MAX_PAGE_SIZE,
            refresh_lock: Mutex::new(()),
            last_fetched: RwLock::new(None),
        }
    }

    /// Replace the clock used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the listing page size (clamped to the provider maximum)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Return the catalog, refetching it if the stored snapshot is missing
    /// or expired.
    ///
    /// A fetch failure propagates and leaves the previous snapshot in place.
    pub async fn get_catalog(&self) -> Result<Arc<CatalogSnapshot>> {
        if let Some(snapshot) = self.valid_snapshot().await {
            debug!("Using cached token list ({} tokens)", snapshot.tokens.len());
            return Ok(snapshot);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(snapshot) = self.valid_snapshot().await {
            debug!("Token list refreshed by a concurrent caller");
            return Ok(snapshot);
        }

        info!("Token list cache missing or expired, fetching from provider");
        self.fetch_and_store().await
    }

    /// Fetch unconditionally and replace the stored snapshot.
    ///
    /// Returns the number of tokens in the new snapshot.
    pub async fn refresh_catalog(&self) -> Result<usize> {
        let _guard = self.refresh_lock.lock().await;
        info!("Forcing token list refresh");
        let snapshot = self.fetch_and_store().await?;
        Ok(snapshot.tokens.len())
    }

    /// Timestamp of the current snapshot, valid or not
    pub async fn last_update_time(&self) -> Option<i64> {
        self.current_snapshot().await.map(|s| s.timestamp)
    }

    /// Look up one token by provider id
    pub async fn find_by_id(&self, id: u64) -> Result<Option<Token>> {
        let snapshot = self.get_catalog().await?;
        Ok(snapshot.tokens.iter().find(|t| t.id == id).cloned())
    }

    /// Describe the stored snapshot without fetching
    pub async fn snapshot_info(&self) -> CatalogStatus {
        let snapshot = self.current_snapshot().await;
        let now = self.clock.now_ms();

        CatalogStatus {
            last_update: snapshot.as_ref().map(|s| s.timestamp),
            expires_at: snapshot.as_ref().map(|s| s.expires_at()),
            token_count: snapshot.as_ref().map_or(0, |s| s.tokens.len()),
            valid: snapshot.as_ref().is_some_and(|s| s.is_valid_at(now)),
            backend: self.store.describe(),
        }
    }

    /// Newer of the stored snapshot and the last one fetched here
    async fn current_snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        let stored = self.store.read().await;
        let held = self.last_fetched.read().ok().and_then(|guard| guard.clone());

        match (stored, held) {
            (Some(stored), Some(held)) if held.timestamp > stored.timestamp => Some(held),
            (stored, held) => stored.or(held),
        }
    }

    async fn valid_snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        let snapshot = self.current_snapshot().await?;
        snapshot
            .is_valid_at(self.clock.now_ms())
            .then_some(snapshot)
    }

    // Caller holds refresh_lock
    async fn fetch_and_store(&self) -> Result<Arc<CatalogSnapshot>> {
        let api = Arc::clone(&self.api);
        let pages = catalog_pages(self.page_size, CATALOG_PAGE_COUNT);

        let fetched = fetch_pages_ordered(
            pages,
            move |page| {
                let api = Arc::clone(&api);
                async move { api.list_tokens(page).await }
            },
            CATALOG_PAGE_COUNT,
        )
        .await?;

        let tokens = dedupe_by_id(fetched);
        let snapshot = Arc::new(CatalogSnapshot {
            timestamp: self.clock.now_ms(),
            expires_in: ttl_millis(self.ttl),
            tokens,
        });

        info!("Fetched {} tokens", snapshot.tokens.len());

        if let Ok(mut held) = self.last_fetched.write() {
            *held = Some(Arc::clone(&snapshot));
        }

        if let Err(e) = self.store.write(Arc::clone(&snapshot)).await {
            warn!("Failed to persist token list: {}", e);
        }

        Ok(snapshot)
    }
}

/// Drop repeated ids, keeping the first (higher-ranked) occurrence.
///
/// Pages are fetched concurrently, so a token whose rank moved between the
/// two requests can appear in both.
fn dedupe_by_id(tokens: Vec<Token>) -> Vec<Token> {
    let mut seen = HashSet::with_capacity(tokens.len());
    let before = tokens.len();
    let deduped: Vec<Token> = tokens.into_iter().filter(|t| seen.insert(t.id)).collect();

    if deduped.len() != before {
        debug!("Dropped {} duplicate tokens across pages", before - deduped.len());
    }
    deduped
}
