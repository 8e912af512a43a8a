//! Command execution context
//!
//! Wires configuration into the shared services (provider client, caches,
//! follower sources) once per process. Both the CLI commands and the HTTP
//! server run on top of it.

use std::sync::Arc;

use crate::cache::catalog::CATALOG_FILE;
use crate::cache::followers::{FOLLOWERS_FILE, FollowerMap};
use crate::cache::{CatalogSnapshot, FollowerCache, TokenCatalog, open_store};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::{CoinMarketCapClient, MarketDataApi};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::MetricsService;
use crate::social::{Enricher, FollowerSource, ScrapeServiceSource, TwitterApiSource};

/// Context for command execution containing config, services and output format.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub catalog: Arc<TokenCatalog>,
    pub followers: Arc<FollowerCache>,
    pub enricher: Arc<Enricher>,
    pub metrics: Arc<MetricsService>,
}

impl CommandContext {
    /// Load configuration and build services.
    ///
    /// A missing API key is not an error here; commands that reach the
    /// provider fail at request time instead.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = opts.load_config()?;
        let api: Arc<dyn MarketDataApi> = Arc::new(CoinMarketCapClient::with_base_url(
            config.api_key.clone(),
            &config.api_host,
            config.rate_limit_per_second,
        )?);
        Self::with_api(config, opts.format, api)
    }

    /// Build services around an existing provider client
    pub fn with_api(
        config: Config,
        format: OutputFormat,
        api: Arc<dyn MarketDataApi>,
    ) -> Result<Self> {
        log::debug!(
            "Cache backend: {} (dir {})",
            config.cache_backend,
            config.cache_dir.display()
        );

        let catalog_store =
            open_store::<CatalogSnapshot>(config.cache_backend, &config.cache_dir, CATALOG_FILE);
        let catalog = Arc::new(TokenCatalog::new(
            Arc::clone(&api),
            catalog_store,
            config.token_list_ttl(),
        ));

        let follower_store =
            open_store::<FollowerMap>(config.cache_backend, &config.cache_dir, FOLLOWERS_FILE);
        let followers = Arc::new(FollowerCache::new(follower_store, config.followers_ttl()));

        let enricher = Arc::new(Enricher::new(
            Arc::clone(&followers),
            follower_sources(&config)?,
        ));
        let metrics = Arc::new(MetricsService::new(api, Arc::clone(&enricher)));

        Ok(Self {
            config,
            format,
            catalog,
            followers,
            enricher,
            metrics,
        })
    }
}

/// Follower sources in fallback order, skipping unconfigured ones
fn follower_sources(config: &Config) -> Result<Vec<Arc<dyn FollowerSource>>> {
    let mut sources: Vec<Arc<dyn FollowerSource>> = Vec::new();

    if let Some(token) = &config.twitter_bearer_token {
        sources.push(Arc::new(TwitterApiSource::with_base_url(
            token.clone(),
            &config.twitter_api_host,
        )?));
    }
    if let Some(url) = &config.scraper_url {
        sources.push(Arc::new(ScrapeServiceSource::new(url.clone())?));
    }

    if sources.is_empty() {
        log::debug!("No follower sources configured; follower counts come from cache only");
    }
    Ok(sources)
}
