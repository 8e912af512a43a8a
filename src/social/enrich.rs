//! Cache-first follower enrichment

use std::sync::Arc;

use log::{debug, info, warn};

use super::{FollowerLookup, FollowerSource};
use crate::cache::{FollowerCache, FollowerReading};

/// Resolves follower readings through the cache and the source chain.
///
/// Never fails: source errors are logged and the chain moves on, and an
/// exhausted chain reads as zero followers.
pub struct Enricher {
    cache: Arc<FollowerCache>,
    sources: Vec<Arc<dyn FollowerSource>>,
}

impl Enricher {
    pub fn new(cache: Arc<FollowerCache>, sources: Vec<Arc<dyn FollowerSource>>) -> Self {
        Self { cache, sources }
    }

    /// Names of the configured sources, in order
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Cached reading if fresh, otherwise resolve and cache.
    pub async fn followers(&self, handle: &str) -> FollowerReading {
        if let Some(reading) = self.cache.get_cached_followers(handle).await {
            debug!("Follower cache hit for {}", handle);
            return reading;
        }
        self.refresh(handle).await
    }

    /// Resolve through the sources, ignoring the cache, and record the result.
    pub async fn refresh(&self, handle: &str) -> FollowerReading {
        let reading = match self.resolve(handle).await {
            FollowerLookup::Count(count) => FollowerReading::count(count),
            FollowerLookup::Suspended => FollowerReading::suspended(),
            FollowerLookup::Unknown => FollowerReading::default(),
        };

        self.cache
            .cache_followers(handle, reading.count, reading.suspended)
            .await;
        reading
    }

    /// Run the source chain; the first definitive answer wins.
    pub async fn resolve(&self, handle: &str) -> FollowerLookup {
        for source in &self.sources {
            match source.lookup(handle).await {
                Ok(lookup) if lookup.is_definitive() => {
                    info!("Resolved followers for {} via {}: {:?}", handle, source.name(), lookup);
                    return lookup;
                }
                Ok(_) => debug!("{} could not resolve {}", source.name(), handle),
                Err(e) => warn!("{} lookup failed for {}: {}", source.name(), handle, e),
            }
        }

        warn!("No follower source resolved {}", handle);
        FollowerLookup::Unknown
    }
}
