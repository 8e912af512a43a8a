//! Metrics command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::metrics::TokenMetrics;
use crate::models::{MetricsDisplay, followers_label};
use crate::output::formatters::{format_percent, format_price, format_usd_compact};
use crate::output::{Formattable, json, table};

/// Fetch and print comparison metrics for the given ids
pub async fn run(opts: &GlobalOptions, ids: &[u64]) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let metrics = ctx.metrics.fetch_metrics(ids).await?;

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !metrics.contains_key(id))
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        log::warn!("No data for ids: {}", missing.join(", "));
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&metrics)?),
        OutputFormat::Table => {
            let rows: Vec<MetricsDisplay> = metrics.values().map(MetricsDisplay::from).collect();
            rows.print(OutputFormat::Table)?;
        }
        OutputFormat::Pretty => {
            if metrics.is_empty() {
                println!("No results found.");
            }
            for m in metrics.values() {
                println!("{} {} (#{})", m.symbol.bold(), m.name, m.id.to_string().dimmed());
                println!("{}\n", table::format_key_values(&card(m)));
            }
        }
    }

    Ok(())
}

fn card(m: &TokenMetrics) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Rank", m.rank.map(|r| r.to_string()).unwrap_or_else(|| "--".into())),
        ("Price", format_price(m.price)),
        ("Market cap", format_usd_compact(m.market_cap)),
        ("Fully diluted", format_usd_compact(m.fully_diluted_market_cap)),
        ("Volume 24h", format_usd_compact(m.volume_24h)),
        ("Turnover", format!("{:.4}", m.turnover)),
        ("Change 1h", format_percent(m.percent_change_1h)),
        ("Change 24h", format_percent(m.percent_change_24h)),
        ("Change 7d", format_percent(m.percent_change_7d)),
        ("Change 30d", format_percent(m.percent_change_30d)),
        ("Circulating", format!("{:.1}%", m.circulating_supply_percent)),
        ("Dominance", format!("{:.2}%", m.dominance)),
    ];

    let followers = followers_label(m.twitter_followers, m.twitter_suspended);
    match &m.twitter_username {
        Some(handle) => rows.push(("Followers", format!("{} (@{})", followers, handle))),
        None => rows.push(("Followers", followers)),
    }

    if let Some(site) = &m.website {
        rows.push(("Website", site.clone()));
    }
    rows
}
