//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};
use crate::config::{CacheBackend, Config};

/// Global CLI options passed to all command handlers.
///
/// Precedence is CLI flag > environment variable > config file > default.
/// Clap resolves the flag/env layer; [`GlobalOptions::apply_to`] lays it
/// over the loaded config.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.tokencompare/config.yaml)
    pub config: Option<String>,

    /// Custom provider API host for development/testing
    pub api_host: Option<String>,

    /// Cache backend override
    pub cache_backend: Option<CacheBackend>,

    pub debug: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
            cache_backend: cli.cache_backend,
            debug: cli.debug,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Load the config file and environment, then apply CLI overrides
    pub fn load_config(&self) -> crate::error::Result<Config> {
        let mut config = Config::load_at(self.config_ref())?;
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Apply CLI overrides on top of a loaded config
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.api_host {
            config.api_host = host.clone();
        }
        if let Some(backend) = self.cache_backend {
            config.cache_backend = backend;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let opts = GlobalOptions {
            api_host: Some("http://localhost:8080".to_string()),
            cache_backend: Some(CacheBackend::Memory),
            ..GlobalOptions::default()
        };

        let mut config = Config::default();
        opts.apply_to(&mut config);

        assert_eq!(config.api_host, "http://localhost:8080");
        assert_eq!(config.cache_backend, CacheBackend::Memory);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let opts = GlobalOptions::default();
        let mut config = Config::default();
        let before = config.api_host.clone();

        opts.apply_to(&mut config);

        assert_eq!(config.api_host, before);
        assert_eq!(config.cache_backend, CacheBackend::File);
        assert_eq!(opts.config_ref(), None);
    }
}
