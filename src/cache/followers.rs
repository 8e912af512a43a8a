//! Per-handle follower count cache
//!
//! Stored as one map `{handle: {value, timestamp, suspended}}`. A write of
//! zero never overwrites a previously known nonzero count: zero usually
//! means the lookup failed, not that the account lost its followers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::storage::SnapshotStore;
use super::{Clock, system_clock, ttl_millis};

/// File name of the follower map inside the cache directory
pub const FOLLOWERS_FILE: &str = "twitter-followers-cache.json";

/// Stored follower entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerEntry {
    /// Last known count
    pub value: u64,
    /// Write time, epoch ms
    pub timestamp: i64,
    #[serde(default)]
    pub suspended: bool,
}

/// Handle to entry map as persisted
pub type FollowerMap = BTreeMap<String, FollowerEntry>;

/// What readers get back for a handle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowerReading {
    pub count: u64,
    pub suspended: bool,
}

impl FollowerReading {
    pub fn count(count: u64) -> Self {
        Self {
            count,
            suspended: false,
        }
    }

    pub fn suspended() -> Self {
        Self {
            count: 0,
            suspended: true,
        }
    }
}

/// Normalize a handle for use as a cache key
pub fn cache_key(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_ascii_lowercase()
}

// Files written before keys were normalized may hold "Bitcoin" or "@bitcoin"
fn find_entry<'a>(map: &'a FollowerMap, key: &str) -> Option<&'a FollowerEntry> {
    map.get(key).or_else(|| {
        map.iter()
            .filter(|(k, _)| cache_key(k) == key)
            .map(|(_, entry)| entry)
            .max_by_key(|entry| entry.timestamp)
    })
}

/// Re-key a map by normalized handle, keeping the newest entry per handle
fn normalize(map: &FollowerMap) -> FollowerMap {
    let mut out = FollowerMap::new();
    for (handle, entry) in map {
        let key = cache_key(handle);
        match out.get(&key) {
            Some(existing) if existing.timestamp >= entry.timestamp => {}
            _ => {
                out.insert(key, *entry);
            }
        }
    }
    out
}

/// TTL-cached follower counts
pub struct FollowerCache {
    store: Arc<dyn SnapshotStore<FollowerMap>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl FollowerCache {
    pub fn new(store: Arc<dyn SnapshotStore<FollowerMap>>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            clock: system_clock(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cached reading for a handle.
    ///
    /// `None` if absent, expired, or stored as an unknown (zero, not
    /// suspended) count. Suspended accounts always read as zero followers.
    pub async fn get_cached_followers(&self, handle: &str) -> Option<FollowerReading> {
        let key = cache_key(handle);
        let map = self.store.read().await?;
        let entry = find_entry(&map, &key)?;

        let age = self.clock.now_ms().saturating_sub(entry.timestamp);
        if age > ttl_millis(self.ttl) {
            debug!("Follower cache expired for {}", key);
            return None;
        }

        match (entry.value, entry.suspended) {
            (_, true) => Some(FollowerReading::suspended()),
            (0, false) => None,
            (value, false) => Some(FollowerReading::count(value)),
        }
    }

    /// Record a reading for a handle.
    ///
    /// Storage failures are logged and swallowed.
    pub async fn cache_followers(&self, handle: &str, count: u64, suspended: bool) {
        let key = cache_key(handle);
        if key.is_empty() {
            return;
        }

        // Serialize read-modify-write so concurrent handles don't drop each other
        let _guard = self.write_lock.lock().await;

        let mut map: FollowerMap = self
            .store
            .read()
            .await
            .map(|m| normalize(&m))
            .unwrap_or_default();

        let value = match map.get(&key) {
            Some(prev) if count == 0 && prev.value > 0 => {
                debug!("Keeping previous count {} for {}", prev.value, key);
                prev.value
            }
            _ => count,
        };

        map.insert(
            key,
            FollowerEntry {
                value,
                timestamp: self.clock.now_ms(),
                suspended,
            },
        );

        if let Err(e) = self.store.write(Arc::new(map)).await {
            warn!("Failed to persist follower cache: {}", e);
        }
    }

    /// All stored entries keyed by normalized handle, including expired ones
    pub async fn entries(&self) -> FollowerMap {
        self.store
            .read()
            .await
            .map(|m| normalize(&m))
            .unwrap_or_default()
    }

    pub fn backend(&self) -> String {
        self.store.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::storage::{FileStore, MemoryStore};
    use crate::cache::testing::ManualClock;
    use tempfile::TempDir;

    const TTL_MS: i64 = 10_000;
    const NOW: i64 = 1_700_000_000_000;

    fn cache() -> (FollowerCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NOW));
        let cache = FollowerCache::new(
            Arc::new(MemoryStore::new()),
            Duration::from_millis(TTL_MS as u64),
        )
        .with_clock(clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_unknown_handle_is_none() {
        let (cache, _) = cache();
        assert_eq!(cache.get_cached_followers("nobody").await, None);
    }

    #[tokio::test]
    async fn test_roundtrip_and_expiry() {
        let (cache, clock) = cache();
        cache.cache_followers("bitcoin", 500, false).await;

        clock.advance(TTL_MS);
        assert_eq!(
            cache.get_cached_followers("bitcoin").await,
            Some(FollowerReading::count(500))
        );

        clock.advance(1);
        assert_eq!(cache.get_cached_followers("bitcoin").await, None);
    }

    #[tokio::test]
    async fn test_zero_does_not_overwrite_known_count() {
        let (cache, clock) = cache();
        cache.cache_followers("bitcoin", 500, false).await;
        clock.advance(5);
        cache.cache_followers("bitcoin", 0, false).await;

        assert_eq!(
            cache.get_cached_followers("bitcoin").await,
            Some(FollowerReading::count(500))
        );

        // Timestamp still moves forward
        assert_eq!(cache.entries().await["bitcoin"].timestamp, NOW + 5);
    }

    #[tokio::test]
    async fn test_unknown_count_is_a_miss() {
        let (cache, _) = cache();
        cache.cache_followers("quiet", 0, false).await;

        assert_eq!(cache.get_cached_followers("quiet").await, None);
        assert!(cache.entries().await.contains_key("quiet"));
    }

    #[tokio::test]
    async fn test_nonzero_overwrites() {
        let (cache, _) = cache();
        cache.cache_followers("bitcoin", 500, false).await;
        cache.cache_followers("bitcoin", 650, false).await;

        assert_eq!(
            cache.get_cached_followers("bitcoin").await,
            Some(FollowerReading::count(650))
        );
    }

    #[tokio::test]
    async fn test_suspended_reads_zero() {
        let (cache, _) = cache();
        cache.cache_followers("rugged", 1200, false).await;
        cache.cache_followers("rugged", 0, true).await;

        assert_eq!(
            cache.get_cached_followers("rugged").await,
            Some(FollowerReading::suspended())
        );

        let entry = cache.entries().await["rugged"];
        assert!(entry.suspended);
        assert_eq!(entry.value, 1200);
    }

    #[tokio::test]
    async fn test_handles_are_case_insensitive() {
        let (cache, _) = cache();
        cache.cache_followers("@Bitcoin", 42, false).await;

        assert_eq!(
            cache.get_cached_followers("bitcoin").await,
            Some(FollowerReading::count(42))
        );
    }

    #[tokio::test]
    async fn test_concurrent_writes_keep_all_handles() {
        let (cache, _) = cache();
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    cache.cache_followers(&format!("h{}", i), i + 1, false).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.entries().await.len(), 20);
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FOLLOWERS_FILE);
        let clock = Arc::new(ManualClock::new(NOW));
        let cache = FollowerCache::new(
            Arc::new(FileStore::new(&path)),
            Duration::from_millis(TTL_MS as u64),
        )
        .with_clock(clock);

        cache.cache_followers("ethereum", 3_100_000, false).await;

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["ethereum"]["value"], 3_100_000);
        assert_eq!(raw["ethereum"]["timestamp"], NOW);
        assert_eq!(raw["ethereum"]["suspended"], false);
    }

    #[tokio::test]
    async fn test_mixed_case_keys_on_disk_are_matched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FOLLOWERS_FILE);
        std::fs::write(
            &path,
            format!(
                r#"{{"Bitcoin": {{"value": 6500000, "timestamp": {now}}},
                    "@Ethereum": {{"value": 3100000, "timestamp": {now}}}}}"#,
                now = NOW
            ),
        )
        .unwrap();

        let clock = Arc::new(ManualClock::new(NOW));
        let cache = FollowerCache::new(
            Arc::new(FileStore::new(&path)),
            Duration::from_millis(TTL_MS as u64),
        )
        .with_clock(clock);

        assert_eq!(
            cache.get_cached_followers("bitcoin").await,
            Some(FollowerReading::count(6_500_000))
        );
        assert_eq!(
            cache.get_cached_followers("ETHEREUM").await,
            Some(FollowerReading::count(3_100_000))
        );

        // A zero write still sees the legacy entry, and the file is re-keyed
        cache.cache_followers("bitcoin", 0, false).await;
        let entries = cache.entries().await;
        assert_eq!(entries["bitcoin"].value, 6_500_000);
        assert!(entries.contains_key("ethereum"));

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(raw.get("Bitcoin").is_none());
        assert_eq!(raw["bitcoin"]["value"], 6_500_000);
    }

    #[test]
    fn test_normalize_keeps_newest_duplicate() {
        let entry = |value, timestamp| FollowerEntry {
            value,
            timestamp,
            suspended: false,
        };
        let map = FollowerMap::from([
            ("Bitcoin".to_string(), entry(1, 10)),
            ("bitcoin".to_string(), entry(2, 20)),
        ]);

        let normalized = normalize(&map);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized["bitcoin"].value, 2);
    }

    #[tokio::test]
    async fn test_reads_entries_without_suspended_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FOLLOWERS_FILE);
        std::fs::write(
            &path,
            format!(r#"{{"solana": {{"value": 2800000, "timestamp": {}}}}}"#, NOW),
        )
        .unwrap();

        let clock = Arc::new(ManualClock::new(NOW));
        clock.set(NOW + 1);
        let cache = FollowerCache::new(
            Arc::new(FileStore::new(&path)),
            Duration::from_millis(TTL_MS as u64),
        )
        .with_clock(clock);

        assert_eq!(
            cache.get_cached_followers("solana").await,
            Some(FollowerReading::count(2_800_000))
        );
    }
}
