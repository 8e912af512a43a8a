//! Search command implementation

use crate::cli::CommandContext;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::error::Result;
use crate::models::SearchResultDisplay;
use crate::output::{Formattable, json};
use crate::search::{Scored, SearchResult, rank_scored};

/// Run the search command against the cached catalog
pub async fn run(opts: &GlobalOptions, query: &str, limit: Option<usize>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let query = query.trim();
    if query.is_empty() {
        log::debug!("Blank query, skipping catalog");
        return print_hits(&[], ctx.format);
    }

    let snapshot = ctx.catalog.get_catalog().await?;
    let mut hits = rank_scored(&snapshot.tokens, query);
    if let Some(limit) = limit {
        hits.truncate(limit);
    }
    log::debug!("{} matches for '{}'", hits.len(), query);

    print_hits(&hits, ctx.format)
}

fn print_hits(hits: &[Scored<'_>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let results: Vec<SearchResult> =
                hits.iter().map(|s| SearchResult::from(s.token)).collect();
            println!("{}", json::format_json_list(&results)?);
        }
        format => {
            let rows: Vec<SearchResultDisplay> =
                hits.iter().map(SearchResultDisplay::from).collect();
            rows.print(format)?;
        }
    }
    Ok(())
}
