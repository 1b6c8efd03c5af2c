//! Core data types for historical market data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`OhlcvBar`] - OHLCV price bar
//! - [`Dataset`] - Ordered OHLCV time series

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// OHLCV (Open, High, Low, Close, Volume) bar data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    /// Timestamp of the bar.
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Trading volume.
    pub volume: f64,
    /// Split/dividend adjusted closing price.
    pub adjusted_close: Option<f64>,
}

impl OhlcvBar {
    /// Creates a new OHLCV bar.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adjusted_close: None,
        }
    }

    /// Sets the adjusted close price.
    #[must_use]
    pub const fn with_adjusted_close(mut self, adjusted_close: f64) -> Self {
        self.adjusted_close = Some(adjusted_close);
        self
    }
}

/// An ordered OHLCV time series.
///
/// Invariant: bar timestamps are strictly increasing with no duplicates.
/// [`Dataset::from_bars`] establishes the invariant by sorting and collapsing
/// duplicate timestamps (the last occurrence wins). Data read back from
/// untrusted storage must be routed through `from_bars` again.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    bars: Vec<OhlcvBar>,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub const fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Builds a dataset from bars, sorting by timestamp and collapsing
    /// duplicate timestamps (last occurrence wins).
    #[must_use]
    pub fn from_bars(mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);
        let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
                _ => deduped.push(bar),
            }
        }
        Self { bars: deduped }
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if there are no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the bars as a slice.
    #[must_use]
    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    /// Returns an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &OhlcvBar> {
        self.bars.iter()
    }

    /// Consumes the dataset and returns the underlying vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<OhlcvBar> {
        self.bars
    }

    /// Returns the time range covered by this dataset.
    #[must_use]
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.bars.first()?.timestamp;
        let last = self.bars.last()?.timestamp;
        Some((first, last))
    }
}

impl IntoIterator for Dataset {
    type Item = OhlcvBar;
    type IntoIter = std::vec::IntoIter<OhlcvBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.into_iter()
    }
}

impl FromIterator<OhlcvBar> for Dataset {
    fn from_iter<I: IntoIterator<Item = OhlcvBar>>(iter: I) -> Self {
        Self::from_bars(iter.into_iter().collect())
    }
}
