//! Historical market-data CLI.
//!
//! # Usage examples
//!
//! ```bash
//! # Apple daily history over the default lookback window
//! histdata AAPL
//!
//! # Bitcoin hourly data
//! histdata BTC-USD -i 1h
//!
//! # Microsoft daily data for 2023, refreshed from the provider
//! histdata MSFT -s 2023-01-01 -e 2023-12-31 --refresh
//!
//! # Several tickers in one run; failures are reported and skipped
//! histdata AAPL MSFT GOOGL
//!
//! # List available crypto tickers
//! histdata -m crypto
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use histdata::{
    DatasetCache, Fetcher, FsCache, Interval, NoopCache, RequestSpec, YahooProvider,
};

mod output;
mod tickers;

use output::{csv_file_name, print_summary, write_csv};
use tickers::Market;

/// Fetch historical market data with local caching and retry.
#[derive(Parser, Debug)]
#[command(name = "histdata")]
#[command(about = "Fetch historical market data with local caching and retry")]
#[command(version)]
struct Cli {
    /// Ticker symbols on Yahoo Finance (e.g. AAPL, BTC-USD)
    #[arg(value_name = "TICKER")]
    tickers: Vec<String>,

    /// Historical start date (YYYY-MM-DD); requires --end
    #[arg(short, long)]
    start: Option<NaiveDate>,

    /// Historical end date (YYYY-MM-DD); requires --start
    #[arg(short, long)]
    end: Option<NaiveDate>,

    /// Data granularity (1m, 2m, 5m, 15m, 30m, 60m, 90m, 1h, 1d, 5d, 1wk, 1mo, 3mo)
    #[arg(short, long, default_value = "1d")]
    interval: Interval,

    /// List available tickers for an asset class and exit
    #[arg(short, long, value_enum)]
    market: Option<Market>,

    /// Directory for cached datasets
    #[arg(long, default_value = "./cache/histdata", value_name = "DIR")]
    cache_dir: PathBuf,

    /// Directory for rendered CSV files
    #[arg(long, default_value = ".", value_name = "DIR")]
    output_dir: PathBuf,

    /// Refetch even when a cached entry exists
    #[arg(long)]
    refresh: bool,

    /// Disable the on-disk cache entirely
    #[arg(long, conflicts_with = "refresh")]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(market) = cli.market {
        println!("Available {market} tickers:");
        for ticker in market.tickers() {
            println!("  {ticker}");
        }
        return ExitCode::SUCCESS;
    }

    if cli.tickers.is_empty() {
        error!("no ticker symbols given; use --market to list available tickers");
        return ExitCode::FAILURE;
    }

    let range = match (cli.start, cli.end) {
        (Some(start), Some(end)) => Some((start, end)),
        (None, None) => None,
        _ => {
            error!("--start and --end must be given together");
            return ExitCode::FAILURE;
        }
    };

    let cache: Arc<dyn DatasetCache> = if cli.no_cache {
        Arc::new(NoopCache::new())
    } else {
        Arc::new(FsCache::new(&cli.cache_dir))
    };
    let fetcher = Fetcher::new(Arc::new(YahooProvider::new())).with_cache(cache);

    // Tickers run sequentially; a failed one is reported and the rest
    // still run.
    let mut failed = 0usize;
    for ticker in &cli.tickers {
        if let Err(error) = run_ticker(&fetcher, &cli, ticker, range).await {
            error!(ticker = %ticker, error = %error, "fetch failed");
            failed += 1;
        }
    }

    if failed > 0 {
        error!("{failed} of {} tickers failed", cli.tickers.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Fetches one ticker, prints the summary, and renders the CSV.
async fn run_ticker(
    fetcher: &Fetcher,
    cli: &Cli,
    ticker: &str,
    range: Option<(NaiveDate, NaiveDate)>,
) -> histdata::Result<()> {
    let spec = match range {
        Some((start, end)) => RequestSpec::with_range(ticker, cli.interval, start, end)?,
        None => RequestSpec::new(ticker, cli.interval),
    };

    info!(ticker = %spec.symbol(), interval = %cli.interval, "fetching");
    let dataset = if cli.refresh {
        fetcher.fetch_fresh(&spec).await?
    } else {
        fetcher.fetch(&spec).await?
    };

    print_summary(spec.symbol(), &dataset);

    let path = cli.output_dir.join(csv_file_name(&spec.normalized()));
    match write_csv(&dataset, &path) {
        Ok(()) => println!("Data saved to: {}", path.display()),
        // A rendering failure is a warning: the fetch itself succeeded.
        Err(error) => warn!(path = %path.display(), error = %error, "failed to write CSV"),
    }

    Ok(())
}
