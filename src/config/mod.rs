//! Configuration management for TokenCompare
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! environment variables. CLI flags are applied last by the command context.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// CoinMarketCap Pro API base URL
pub const DEFAULT_API_HOST: &str = "https://pro-api.coinmarketcap.com";

/// Twitter API base URL
pub const DEFAULT_TWITTER_API_HOST: &str = "https://api.twitter.com";

/// Default TTL for both caches: 4 hours in milliseconds
pub const DEFAULT_CACHE_TTL_MS: u64 = 4 * 60 * 60 * 1000;

/// Where cached snapshots live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process memory; lost on restart
    Memory,
    /// JSON files under `cache_dir`
    #[default]
    File,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(CacheBackend::Memory),
            "file" | "disk" => Ok(CacheBackend::File),
            other => Err(ConfigError::Invalid(format!(
                "unknown cache backend '{}', expected 'memory' or 'file'",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CoinMarketCap Pro API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Market data API base URL
    pub api_host: String,

    /// Cache storage backend
    pub cache_backend: CacheBackend,

    /// Directory for file-backed caches
    pub cache_dir: PathBuf,

    /// Token catalog TTL in milliseconds
    pub token_list_ttl_ms: u64,

    /// Follower cache TTL in milliseconds
    pub followers_ttl_ms: u64,

    /// Bearer token for the Twitter API follower source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_bearer_token: Option<String>,

    /// Twitter API base URL
    pub twitter_api_host: String,

    /// Browser-automation scrape service endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraper_url: Option<String>,

    /// HTTP listen address for `serve`
    pub bind: String,

    /// Client-side request budget against the market data API
    pub rate_limit_per_second: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: DEFAULT_API_HOST.to_string(),
            cache_backend: CacheBackend::default(),
            cache_dir: PathBuf::from("cache"),
            token_list_ttl_ms: DEFAULT_CACHE_TTL_MS,
            followers_ttl_ms: DEFAULT_CACHE_TTL_MS,
            twitter_bearer_token: None,
            twitter_api_host: DEFAULT_TWITTER_API_HOST.to_string(),
            scraper_url: None,
            bind: "127.0.0.1:3000".to_string(),
            rate_limit_per_second: 5,
        }
    }
}

impl Config {
    /// Get the default config file path (~/.tokencompare/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".tokencompare").join("config.yaml"))
    }

    /// Load configuration from an explicit path or the default location,
    /// then apply environment overrides.
    ///
    /// An explicit path must exist; a missing default file just means defaults.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(Path::new(p))?,
            None => {
                let default = Self::default_path()?;
                if default.exists() {
                    Self::load_from(&default)?
                } else {
                    log::debug!("No config file at {}, using defaults", default.display());
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Apply environment variable overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("CMC_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(host) = non_empty("TOKENCOMPARE_API_HOST") {
            self.api_host = host;
        }
        if non_empty("VERCEL").as_deref() == Some("1") {
            self.cache_backend = CacheBackend::Memory;
        }
        if let Some(backend) = non_empty("TOKENCOMPARE_CACHE_BACKEND") {
            match backend.parse() {
                Ok(b) => self.cache_backend = b,
                Err(e) => log::warn!("Ignoring TOKENCOMPARE_CACHE_BACKEND: {}", e),
            }
        }
        if let Some(dir) = non_empty("TOKENCOMPARE_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(ttl) = non_empty("TOKEN_LIST_CACHE_DURATION") {
            self.token_list_ttl_ms = parse_ttl("TOKEN_LIST_CACHE_DURATION", &ttl);
        }
        if let Some(ttl) = non_empty("TWITTER_CACHE_DURATION") {
            self.followers_ttl_ms = parse_ttl("TWITTER_CACHE_DURATION", &ttl);
        }
        if let Some(token) = non_empty("TWITTER_BEARER_TOKEN") {
            self.twitter_bearer_token = Some(token);
        }
        if let Some(host) = non_empty("TOKENCOMPARE_TWITTER_API_HOST") {
            self.twitter_api_host = host;
        }
        if let Some(url) = non_empty("TOKENCOMPARE_SCRAPER_URL") {
            self.scraper_url = Some(url);
        }
        if let Some(bind) = non_empty("TOKENCOMPARE_BIND") {
            self.bind = bind;
        }
    }

    /// Token catalog TTL
    pub fn token_list_ttl(&self) -> Duration {
        Duration::from_millis(self.token_list_ttl_ms)
    }

    /// Follower cache TTL
    pub fn followers_ttl(&self) -> Duration {
        Duration::from_millis(self.followers_ttl_ms)
    }

    /// Parse the bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind.parse().map_err(|e| {
            ConfigError::Invalid(format!("invalid bind address '{}': {}", self.bind, e)).into()
        })
    }

    /// Return the API key, or an error if it is not configured
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingApiKey.into())
    }
}

/// Parse a millisecond TTL, falling back to the default on garbage
fn parse_ttl(var: &str, value: &str) -> u64 {
    match value.trim().parse::<u64>() {
        Ok(ms) => ms,
        Err(_) => {
            log::warn!(
                "{}='{}' is not a millisecond count, using default {}",
                var,
                value,
                DEFAULT_CACHE_TTL_MS
            );
            DEFAULT_CACHE_TTL_MS
        }
    }
}
