//! Local caches for provider and social data
//!
//! Two TTL caches share one storage abstraction: the token catalog snapshot
//! and the follower-count map. Each is backed by either process memory or a
//! JSON file, selected once at startup.

pub mod catalog;
pub mod followers;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

/// Source of "now" in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Shared wall clock handle
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Saturating conversion of a TTL to milliseconds
pub(crate) fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}


pub use catalog::{CatalogSnapshot, CatalogStatus, TokenCatalog};
pub use followers::{FollowerCache, FollowerEntry, FollowerReading};
pub use storage::{FileStore, MemoryStore, SnapshotStore, open_store};
