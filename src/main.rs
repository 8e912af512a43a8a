//! TokenCompare - token search, comparison metrics and social enrichment
//! backed by CoinMarketCap

use clap::Parser;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod metrics;
mod models;
mod output;
mod search;
mod server;
mod social;

use cli::{CatalogCommands, Cli, Commands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Serve { bind } => cli::serve::run(&opts, bind).await,
        Commands::Search { query, limit } => cli::search::run(&opts, &query, limit).await,
        Commands::Metrics { ids } => cli::metrics::run(&opts, &ids).await,
        Commands::Catalog(cmd) => match cmd {
            CatalogCommands::Refresh => cli::catalog::refresh(&opts).await,
            CatalogCommands::Status => cli::catalog::status(&opts).await,
        },
        Commands::Followers { handle, refresh } => {
            cli::followers::run(&opts, &handle, refresh).await
        }
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("tokencompare version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Log to stderr; RUST_LOG wins over the defaults
fn init_logging(cli: &Cli) {
    let default_level = if cli.debug {
        "debug"
    } else if matches!(cli.command, Commands::Serve { .. }) {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}
