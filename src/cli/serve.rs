//! Serve command implementation

use std::sync::Arc;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::error::Result;
use crate::server::{AppState, run_server};

/// Start the HTTP API
pub async fn run(opts: &GlobalOptions, bind: Option<String>) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    if let Some(bind) = bind {
        ctx.config.bind = bind;
    }
    let addr = ctx.config.bind_addr()?;

    if ctx.config.api_key.is_none() {
        log::warn!("No API key configured; provider requests will fail until CMC_API_KEY is set");
    }
    log::info!(
        "Follower sources: [{}], cache: {}",
        ctx.enricher.source_names().join(", "),
        ctx.followers.backend()
    );

    let state = Arc::new(AppState::new(ctx.catalog, ctx.metrics));
    run_server(addr, state).await
}
