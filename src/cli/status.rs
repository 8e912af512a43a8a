//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::{Config, DEFAULT_API_HOST};
use crate::error::Result;
use crate::output::formatters::format_duration;

/// Display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "TokenCompare Configuration Status".bold());

    let config_path = match opts.config_ref() {
        Some(path) => path.to_string(),
        None => Config::default_path()?.display().to_string(),
    };

    let config = match opts.load_config() {
        Ok(config) => config,
        Err(e) => {
            println!("{} Failed to load {}: {}", "✗".red(), config_path.cyan(), e);
            return Ok(());
        }
    };
    println!("Config file: {}", config_path.cyan());
    println!();

    if config.api_key.is_some() {
        println!("{} API key configured", "✓".green());
    } else {
        println!("{} API key not configured", "✗".red());
        println!("  → Set CMC_API_KEY or add api_key to the config file");
    }

    if config.api_host != DEFAULT_API_HOST {
        println!("{} Custom API host: {}", "○".dimmed(), config.api_host.cyan());
    }

    println!(
        "{} Cache backend: {} ({})",
        "✓".green(),
        config.cache_backend,
        config.cache_dir.display()
    );
    println!(
        "{} Token list TTL: {}, follower TTL: {}",
        "✓".green(),
        format_duration(config.token_list_ttl()),
        format_duration(config.followers_ttl())
    );

    let mut sources = Vec::new();
    if config.twitter_bearer_token.is_some() {
        sources.push("twitter-api");
    }
    if config.scraper_url.is_some() {
        sources.push("scraper");
    }
    if sources.is_empty() {
        println!("{} No follower sources configured", "○".dimmed());
    } else {
        println!("{} Follower sources: {}", "✓".green(), sources.join(", "));
    }

    println!("{} Listen address: {}", "○".dimmed(), config.bind);
    println!();
    Ok(())
}
