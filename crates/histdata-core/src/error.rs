//! Error types for fetch and cache operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when validating a request, fetching from a provider, or caching the result.
//! Callers match on the variant to decide how to react; [`DataError::is_transient`]
//! is the classification the retry layer uses.

use thiserror::Error;

/// Errors that can occur during fetch and cache operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// The request itself is malformed (bad interval, inverted date range).
    /// Never retried.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// Server-side failure (5xx-equivalent) that is expected to resolve on retry.
    #[error("Server error: HTTP {status} for {symbol}")]
    ServerError {
        /// HTTP status code returned by the provider.
        status: u16,
        /// The symbol that was requested.
        symbol: String,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider returned an empty series for the requested range.
    #[error("No data available for {symbol} in range {start} to {end}")]
    NoData {
        /// The symbol that was requested.
        symbol: String,
        /// Start of the requested date range.
        start: String,
        /// End of the requested date range.
        end: String,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache. Non-fatal: the fetch pipeline logs
    /// these and carries on, they never escalate to a fetch failure.
    #[error("Cache error: {0}")]
    Cache(String),

    /// All retry attempts were exhausted; wraps the last transient error.
    #[error("Fetch failed after {attempts} attempts: {source}")]
    FetchFailed {
        /// How many attempts were made before giving up.
        attempts: u32,
        /// The last transient error observed.
        #[source]
        source: Box<DataError>,
    },
}

impl DataError {
    /// Returns true if this failure is expected to resolve on retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::ServerError { .. }
        )
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(DataError::Network("timeout".into()).is_transient());
        assert!(
            DataError::RateLimited {
                provider: "test".into(),
                retry_after: None,
            }
            .is_transient()
        );
        assert!(
            DataError::ServerError {
                status: 503,
                symbol: "AAPL".into(),
            }
            .is_transient()
        );
    }

    #[test]
    fn permanent_classification() {
        assert!(!DataError::InvalidRequest("bad interval".into()).is_transient());
        assert!(!DataError::SymbolNotFound("NOPE".into()).is_transient());
        assert!(!DataError::Parse("bad json".into()).is_transient());
        assert!(!DataError::Cache("disk full".into()).is_transient());
    }

    #[test]
    fn fetch_failed_preserves_source() {
        let err = DataError::FetchFailed {
            attempts: 3,
            source: Box::new(DataError::Network("timeout".into())),
        };
        assert!(err.to_string().contains("after 3 attempts"));
        assert!(err.to_string().contains("timeout"));
    }
}
