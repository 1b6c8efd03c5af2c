//! Provider traits for fetching market data.
//!
//! This module defines the remote boundary of the fetch pipeline:
//!
//! - [`DataProvider`] - Base trait with provider metadata
//! - [`PriceDataProvider`] - Historical OHLCV price data

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{error::Result, interval::Interval, types::Dataset, types::Symbol};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g. "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the intervals supported by this provider.
    fn supported_intervals(&self) -> &[Interval];
}

/// Provider for historical OHLCV price data.
///
/// This is the single remote call the fetch pipeline wraps with retry and
/// caching. Implementations classify failures through the [`crate::DataError`]
/// taxonomy so the retry layer can distinguish transient from permanent ones.
#[async_trait]
pub trait PriceDataProvider: DataProvider {
    /// Fetches OHLCV data for a symbol over an inclusive date range.
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Dataset>;
}
