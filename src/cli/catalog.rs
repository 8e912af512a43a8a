//! Catalog management commands

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::CatalogStatus;
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::output::formatters::{format_count, format_relative_ms, format_timestamp_ms};
use crate::output::{json, table};

/// Fetch the full token list and replace the cached snapshot
pub async fn refresh(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.config.require_api_key()?;

    let spinner = spinner("Fetching token list...", ctx.format);
    let result = ctx.catalog.refresh_catalog().await;
    spinner.finish_and_clear();
    let count = result?;

    match ctx.format {
        OutputFormat::Json => {
            println!(
                "{}",
                json::format_json(&serde_json::json!({ "success": true, "tokenCount": count }))?
            );
        }
        _ => println!(
            "{} Cached {} tokens ({})",
            "✓".green(),
            format_count(count as u64),
            ctx.catalog.snapshot_info().await.backend
        ),
    }
    Ok(())
}

/// Show the cached snapshot without fetching
pub async fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let info = ctx.catalog.snapshot_info().await;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&info)?),
        _ => {
            println!("{}", "Token Catalog".bold());
            println!(
                "{}",
                table::format_key_values(&status_rows(&info, chrono::Utc::now().timestamp_millis()))
            );
        }
    }
    Ok(())
}

fn status_rows(info: &CatalogStatus, now_ms: i64) -> Vec<(&'static str, String)> {
    let stamp = |ms: Option<i64>| match ms {
        Some(ms) => format!("{} ({})", format_timestamp_ms(ms), format_relative_ms(ms, now_ms)),
        None => "never".to_string(),
    };

    vec![
        ("Backend", info.backend.clone()),
        ("Tokens", format_count(info.token_count as u64)),
        ("Last update", stamp(info.last_update)),
        ("Expires", stamp(info.expires_at)),
        ("Valid", if info.valid { "yes" } else { "no" }.to_string()),
    ]
}

// Hidden for JSON so machine output stays clean
fn spinner(message: &str, format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
