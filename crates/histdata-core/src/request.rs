//! Request specification, normalization, and cache keys.
//!
//! A [`RequestSpec`] is the validated description of one fetch: symbol,
//! interval, and an optional explicit date range. Normalization resolves the
//! default lookback window into concrete dates, producing a
//! [`NormalizedRequest`] from which the [`CacheKey`] fingerprint is derived.

use std::fmt;

use chrono::{NaiveDate, Utc};

use crate::error::{DataError, Result};
use crate::interval::Interval;
use crate::types::Symbol;

/// A validated fetch request.
///
/// Either both `start` and `end` are present with `start <= end`, or both are
/// absent and the interval's default lookback window applies. Immutable once
/// constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestSpec {
    symbol: Symbol,
    interval: Interval,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl RequestSpec {
    /// Creates a request covering the interval's default lookback window.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start: None,
            end: None,
        }
    }

    /// Creates a request covering an explicit date range.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidRequest`] if `start` is after `end`.
    pub fn with_range(
        symbol: impl Into<Symbol>,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        if start > end {
            return Err(DataError::InvalidRequest(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self {
            symbol: symbol.into(),
            interval,
            start: Some(start),
            end: Some(end),
        })
    }

    /// Returns the requested symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns the requested interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Returns the explicit date range, if one was given.
    #[must_use]
    pub const fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Resolves the request against today's date.
    #[must_use]
    pub fn normalized(&self) -> NormalizedRequest {
        self.normalized_at(Utc::now().date_naive())
    }

    /// Resolves the request against a reference date.
    ///
    /// An explicit range passes through unchanged; otherwise the window ends
    /// at `today` and reaches back the interval's default lookback.
    #[must_use]
    pub fn normalized_at(&self, today: NaiveDate) -> NormalizedRequest {
        let (start, end) = self
            .range()
            .unwrap_or_else(|| (today - self.interval.default_lookback(), today));
        NormalizedRequest {
            symbol: self.symbol.clone(),
            interval: self.interval,
            start,
            end,
        }
    }
}

/// A request with its date range fully resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NormalizedRequest {
    /// The requested symbol.
    pub symbol: Symbol,
    /// The requested interval.
    pub interval: Interval,
    /// Inclusive start of the resolved window.
    pub start: NaiveDate,
    /// Inclusive end of the resolved window.
    pub end: NaiveDate,
}

impl NormalizedRequest {
    /// Derives the cache fingerprint for this request.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_request(self)
    }
}

/// Deterministic fingerprint of a normalized request.
///
/// Two requests with identical normalized fields yield identical keys. The
/// key is filename-safe: symbol characters outside `[A-Za-z0-9.-]` are
/// percent-encoded, which keeps distinct symbols from ever colliding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    fn for_request(request: &NormalizedRequest) -> Self {
        Self(format!(
            "{}_{}_{}_{}",
            escape_symbol(request.symbol.as_str()),
            request.interval,
            request.start,
            request.end,
        ))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-encodes symbol bytes outside `[A-Za-z0-9.-]`.
///
/// `%` itself is always encoded, so the mapping is injective.
fn escape_symbol(symbol: &str) -> String {
    let mut escaped = String::with_capacity(symbol.len());
    for byte in symbol.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' => {
                escaped.push(byte as char);
            }
            _ => {
                escaped.push('%');
                escaped.push_str(&format!("{byte:02X}"));
            }
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = RequestSpec::with_range(
            "AAPL",
            Interval::Daily,
            date(2023, 12, 31),
            date(2023, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::InvalidRequest(_)));
    }

    #[test]
    fn single_day_range_is_valid() {
        let spec =
            RequestSpec::with_range("AAPL", Interval::Daily, date(2023, 6, 1), date(2023, 6, 1))
                .unwrap();
        assert_eq!(spec.range(), Some((date(2023, 6, 1), date(2023, 6, 1))));
    }

    #[test]
    fn explicit_range_passes_through_normalization() {
        let spec =
            RequestSpec::with_range("AAPL", Interval::Daily, date(2023, 1, 1), date(2023, 12, 31))
                .unwrap();
        let normalized = spec.normalized_at(date(2024, 6, 1));
        assert_eq!(normalized.start, date(2023, 1, 1));
        assert_eq!(normalized.end, date(2023, 12, 31));
    }

    #[test]
    fn default_window_resolves_from_interval() {
        let today = date(2024, 6, 1);
        let normalized = RequestSpec::new("AAPL", Interval::Minute).normalized_at(today);
        assert_eq!(normalized.end, today);
        assert_eq!(normalized.start, date(2024, 5, 25));
    }

    #[test]
    fn cache_key_is_deterministic() {
        let a = RequestSpec::with_range(
            "aapl",
            Interval::Daily,
            date(2023, 1, 1),
            date(2023, 12, 31),
        )
        .unwrap()
        .normalized_at(date(2024, 1, 1));
        let b = RequestSpec::with_range(
            "AAPL",
            Interval::Daily,
            date(2023, 1, 1),
            date(2023, 12, 31),
        )
        .unwrap()
        .normalized_at(date(2024, 6, 1));
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key().as_str(), "AAPL_1d_2023-01-01_2023-12-31");
    }

    #[test]
    fn keys_differ_when_any_field_differs() {
        let base = RequestSpec::with_range(
            "AAPL",
            Interval::Daily,
            date(2023, 1, 1),
            date(2023, 12, 31),
        )
        .unwrap()
        .normalized_at(date(2024, 1, 1));
        let other_interval = NormalizedRequest {
            interval: Interval::Weekly,
            ..base.clone()
        };
        let other_end = NormalizedRequest {
            end: date(2023, 12, 30),
            ..base.clone()
        };
        assert_ne!(base.cache_key(), other_interval.cache_key());
        assert_ne!(base.cache_key(), other_end.cache_key());
    }

    #[test]
    fn escaping_keeps_distinct_symbols_distinct() {
        assert_eq!(escape_symbol("BTC-USD"), "BTC-USD");
        assert_eq!(escape_symbol("^GSPC"), "%5EGSPC");
        assert_eq!(escape_symbol("EURUSD=X"), "EURUSD%3DX");
        assert_ne!(escape_symbol("^GSPC"), escape_symbol("=GSPC"));
        assert_ne!(escape_symbol("%5EGSPC"), escape_symbol("^GSPC"));
    }
}
