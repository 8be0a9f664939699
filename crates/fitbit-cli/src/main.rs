use std::path::PathBuf;
use std::process;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Parser;

use fitbit_cli::cache::ResponseCache;
use fitbit_cli::client::{FitbitClient, OAuth2Token, OfflineSource, OnlineSource};
use fitbit_cli::config::{default_data_dir, DataPaths};
use fitbit_cli::ingest::{IngestOptions, Ingestor};
use fitbit_cli::{FitbitError, Result};

/// Archive your Fitbit history into a local SQLite database
#[derive(Parser, Debug)]
#[command(name = "fitbit-archive", version, about)]
struct Cli {
    /// OAuth2 access token for the Fitbit Web API
    #[arg(long, env = "FITBIT_ACCESS_TOKEN")]
    token: Option<String>,

    /// Most recent day to process; the run walks backwards from here
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Earliest day worth attempting
    #[arg(long, default_value = "2010-01-01")]
    first: NaiveDate,

    /// Maximum number of days visited in one run
    #[arg(long, default_value_t = 25)]
    limit: u32,

    /// Seconds to wait after a rate-limit response before retrying
    #[arg(long, default_value_t = 3600)]
    cooldown: u64,

    /// Work from the response cache only, never contacting the API
    #[arg(long)]
    offline: bool,

    /// Bypass the response cache entirely
    #[arg(long)]
    no_cache: bool,

    /// Data directory (database, cache and exports)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let base = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let paths = DataPaths::new(base);
    paths.ensure()?;

    let cache = ResponseCache::new(paths.cache_dir(), !cli.no_cache);
    let start = cli.start.unwrap_or_else(|| Local::now().date_naive());
    let mut options = IngestOptions::new(start);
    options.first_date = cli.first;
    options.limit = cli.limit;
    options.cooldown = Duration::from_secs(cli.cooldown);

    println!("Online : {}", !cli.offline);
    println!("Starting : {}, maximum days : {}", start, options.limit);

    if cli.offline {
        Ingestor::new(OfflineSource, cache, paths, options).run().await
    } else {
        let token = cli.token.ok_or(FitbitError::NotAuthenticated)?;
        let source = OnlineSource::new(FitbitClient::new(), OAuth2Token::from_access_token(token));
        Ingestor::new(source, cache, paths, options).run().await
    }
}
