//! Data granularity definitions.
//!
//! This module defines [`Interval`], the granularity of a time series request.
//! The string codes round-trip through [`FromStr`]/[`Interval::as_str`] and
//! match what the provider's wire API accepts.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Granularity of time series data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// One-minute bars.
    Minute,
    /// Two-minute bars.
    TwoMinute,
    /// Five-minute bars.
    FiveMinute,
    /// Fifteen-minute bars.
    FifteenMinute,
    /// Thirty-minute bars.
    ThirtyMinute,
    /// Sixty-minute bars.
    SixtyMinute,
    /// Ninety-minute bars.
    NinetyMinute,
    /// Hourly bars.
    Hourly,
    /// Daily bars.
    Daily,
    /// Five-day bars.
    FiveDay,
    /// Weekly bars.
    Weekly,
    /// Monthly bars.
    Monthly,
    /// Quarterly bars.
    Quarterly,
}

impl Interval {
    /// All supported intervals.
    pub const ALL: &'static [Self] = &[
        Self::Minute,
        Self::TwoMinute,
        Self::FiveMinute,
        Self::FifteenMinute,
        Self::ThirtyMinute,
        Self::SixtyMinute,
        Self::NinetyMinute,
        Self::Hourly,
        Self::Daily,
        Self::FiveDay,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
    ];

    /// Returns the wire code for this interval (e.g. `1d`, `1wk`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "1m",
            Self::TwoMinute => "2m",
            Self::FiveMinute => "5m",
            Self::FifteenMinute => "15m",
            Self::ThirtyMinute => "30m",
            Self::SixtyMinute => "60m",
            Self::NinetyMinute => "90m",
            Self::Hourly => "1h",
            Self::Daily => "1d",
            Self::FiveDay => "5d",
            Self::Weekly => "1wk",
            Self::Monthly => "1mo",
            Self::Quarterly => "3mo",
        }
    }

    /// Returns true if this is an intraday interval (minute through hourly).
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        matches!(
            self,
            Self::Minute
                | Self::TwoMinute
                | Self::FiveMinute
                | Self::FifteenMinute
                | Self::ThirtyMinute
                | Self::SixtyMinute
                | Self::NinetyMinute
                | Self::Hourly
        )
    }

    /// Default lookback window when a request carries no explicit date range.
    ///
    /// Intraday windows are short because providers only keep a few weeks of
    /// minute-level history; coarser intervals look further back.
    #[must_use]
    pub fn default_lookback(&self) -> Duration {
        match self {
            Self::Minute => Duration::days(7),
            Self::TwoMinute
            | Self::FiveMinute
            | Self::FifteenMinute
            | Self::ThirtyMinute
            | Self::SixtyMinute
            | Self::NinetyMinute
            | Self::Hourly => Duration::days(60),
            Self::Daily => Duration::days(730),
            Self::FiveDay | Self::Weekly => Duration::days(1825),
            Self::Monthly | Self::Quarterly => Duration::days(3650),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| {
                DataError::InvalidRequest(format!(
                    "unsupported interval '{s}' (expected one of: {})",
                    Self::ALL
                        .iter()
                        .map(|i| i.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_round_trip() {
        for interval in Interval::ALL {
            assert_eq!(interval.as_str().parse::<Interval>().unwrap(), *interval);
        }
    }

    #[test]
    fn unknown_code_is_invalid_request() {
        let err = "4h".parse::<Interval>().unwrap_err();
        assert!(matches!(err, DataError::InvalidRequest(_)));
    }

    #[test]
    fn intraday_split() {
        assert!(Interval::Minute.is_intraday());
        assert!(Interval::Hourly.is_intraday());
        assert!(!Interval::Daily.is_intraday());
        assert!(!Interval::Monthly.is_intraday());
    }

    #[test]
    fn lookback_widens_with_granularity() {
        assert!(Interval::Minute.default_lookback() < Interval::Hourly.default_lookback());
        assert!(Interval::Hourly.default_lookback() < Interval::Daily.default_lookback());
        assert!(Interval::Daily.default_lookback() < Interval::Monthly.default_lookback());
    }
}
