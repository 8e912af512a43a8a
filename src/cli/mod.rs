//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod catalog;
pub mod context;
pub mod followers;
pub mod metrics;
pub mod search;
pub mod serve;
pub mod status;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

use crate::config::CacheBackend;

/// tokencompare - search and compare crypto tokens backed by CoinMarketCap
#[derive(Parser, Debug)]
#[command(name = "tokencompare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "TOKENCOMPARE_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "TOKENCOMPARE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "TOKENCOMPARE_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Override the market data API host
    #[arg(long, global = true, env = "TOKENCOMPARE_API_HOST", hide = true)]
    pub api_host: Option<String>,

    /// Cache backend (memory, file)
    #[arg(long, global = true, value_enum)]
    pub cache_backend: Option<CacheBackend>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides config `bind`)
        #[arg(long, env = "TOKENCOMPARE_BIND", hide_env = true)]
        bind: Option<String>,
    },

    /// Search the token catalog
    Search {
        /// Symbol or name fragment
        query: String,

        /// Maximum number of results
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show comparison metrics for token ids
    Metrics {
        /// Provider token ids (space or comma separated)
        #[arg(required = true, num_args = 1.., value_delimiter = ',')]
        ids: Vec<u64>,
    },

    /// Manage the cached token catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Show follower count for a social handle
    Followers {
        /// Handle, with or without a leading @
        handle: String,

        /// Ignore the cache and query the follower sources
        #[arg(long)]
        refresh: bool,
    },

    /// Show configuration status
    Status,

    /// Display version information
    Version,
}

/// Catalog subcommands
#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Fetch the full token list now
    Refresh,

    /// Show the cached snapshot's age and size
    Status,
}
