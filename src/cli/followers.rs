//! Followers command implementation

use crate::cache::followers::cache_key;
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::{Error, Result};
use crate::models::FollowerDisplay;
use crate::output::{Formattable, json};

/// Show the follower reading for a handle, through the cache unless `refresh`
pub async fn run(opts: &GlobalOptions, handle: &str, refresh: bool) -> Result<()> {
    let key = cache_key(handle);
    if key.is_empty() {
        return Err(Error::Other("handle must not be empty".to_string()));
    }

    let ctx = CommandContext::new(opts)?;
    let reading = if refresh {
        ctx.enricher.refresh(&key).await
    } else {
        ctx.enricher.followers(&key).await
    };

    match ctx.format {
        OutputFormat::Json => {
            println!(
                "{}",
                json::format_json(&serde_json::json!({ "handle": key, "followers": reading }))?
            );
        }
        format => {
            let entries = ctx.followers.entries().await;
            vec![FollowerDisplay::new(&key, reading, entries.get(&key))].print(format)?;
        }
    }
    Ok(())
}
