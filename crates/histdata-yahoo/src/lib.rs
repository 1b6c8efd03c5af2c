#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/histdata/histdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data provider.
//!
//! This crate provides a Yahoo Finance data provider that implements the
//! [`DataProvider`] and [`PriceDataProvider`] traits from `histdata-core`.
//!
//! # Features
//!
//! - Fetch OHLCV data using Yahoo Finance's chart API
//! - Built-in rate limiting (1 request per second by default)
//! - Adjusted close prices included in every bar
//! - Transient/permanent failure classification for the retry layer
//!
//! # Example
//!
//! ```no_run
//! use histdata_yahoo::YahooProvider;
//! use histdata_core::{PriceDataProvider, Symbol, Interval};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> histdata_core::Result<()> {
//! let provider = YahooProvider::new();
//! let symbol = Symbol::new("AAPL");
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!
//! let dataset = provider.fetch_ohlcv(&symbol, start, end, Interval::Daily).await?;
//! println!("Fetched {} bars", dataset.len());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use histdata_core::{
    DataError, DataProvider, Dataset, Interval, OhlcvBar, PriceDataProvider, Result, Symbol,
};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// Fallback wait when a rate-limit response carries no Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`] and [`PriceDataProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Create a new Yahoo Finance provider with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            rate_limit_ms: rate_limit.as_millis() as u64,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Build the chart API URL for a symbol and date range.
    fn build_chart_url(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        format!(
            "{}/{}?period1={}&period2={}&interval={}&includeAdjustedClose=true",
            CHART_API_URL,
            symbol.as_str(),
            start_ts,
            end_ts,
            interval.as_str()
        )
    }

    /// Parse Yahoo Finance chart response into a dataset.
    fn parse_chart_response(
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
        response: ChartResponse,
    ) -> Result<Dataset> {
        let result = response
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::Parse("Missing quote data".to_string()))?;

        let adj_close = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            // Bars with missing OHLC values (halted sessions, in-progress
            // periods) are dropped rather than invented.
            let (Some(open), Some(high), Some(low), Some(close)) = (
                value_at(&quote.open, i),
                value_at(&quote.high, i),
                value_at(&quote.low, i),
                value_at(&quote.close, i),
            ) else {
                continue;
            };

            let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
                continue;
            };
            let timestamp = normalize_timestamp(timestamp, interval);

            // Indices and forex report no volume.
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0) as f64;

            let mut bar = OhlcvBar::new(timestamp, open, high, low, close, volume);
            if let Some(adjusted) = adj_close.get(i).copied().flatten() {
                bar = bar.with_adjusted_close(adjusted);
            }
            bars.push(bar);
        }

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Dataset::from_bars(bars))
    }
}

/// Look up an optional value in a quote array.
fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

/// Truncate daily-and-coarser timestamps to midnight UTC.
///
/// Yahoo reports daily bars at the exchange's session open; normalizing to
/// the date keeps cache keys and rendered output independent of exchange
/// time zones.
fn normalize_timestamp(timestamp: DateTime<Utc>, interval: Interval) -> DateTime<Utc> {
    if interval.is_intraday() {
        return timestamp;
    }
    timestamp
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or(timestamp)
}

/// Extract the Retry-After hint from a rate-limit response.
fn retry_after_hint(response: &reqwest::Response) -> Duration {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs)
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance data provider for historical OHLCV data"
    }

    fn supported_intervals(&self) -> &[Interval] {
        Interval::ALL
    }
}

#[async_trait]
impl PriceDataProvider for YahooProvider {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Dataset> {
        // Validate date range
        if start > end {
            return Err(DataError::InvalidRequest(format!(
                "start date {start} is after end date {end}"
            )));
        }

        // Apply rate limiting
        self.apply_rate_limit().await;

        let url = self.build_chart_url(symbol, start, end, interval);
        debug!("Fetching OHLCV: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: self.name().to_string(),
                retry_after: Some(retry_after_hint(&response)),
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }

        if status.is_server_error() {
            return Err(DataError::ServerError {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        if !status.is_success() {
            return Err(DataError::Network(format!("HTTP {status} for {symbol}")));
        }

        let chart_response: ChartResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        // Check for API-level errors
        if let Some(error) = chart_response.chart.error {
            if error.code == "Not Found" {
                return Err(DataError::SymbolNotFound(symbol.to_string()));
            }
            return Err(DataError::Parse(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        Self::parse_chart_response(symbol, start, end, interval, chart_response)
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Vec<ChartData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}
