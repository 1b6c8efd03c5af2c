#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/histdata/histdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for fetching historical market data.
//!
//! This crate provides the foundational abstractions of the fetch pipeline:
//!
//! - [`RequestSpec`](request::RequestSpec) - Validated fetch request
//! - [`CacheKey`](request::CacheKey) - Deterministic request fingerprint
//! - [`Dataset`](types::Dataset) - Ordered OHLCV time series
//! - [`PriceDataProvider`](provider::PriceDataProvider) - Remote data boundary
//! - [`DatasetCache`](cache::DatasetCache) - Caching abstraction
//! - [`RetryPolicy`](retry::RetryPolicy) - Bounded exponential backoff

/// Cache trait for storing fetched datasets.
pub mod cache;
/// Error types for fetch and cache operations.
pub mod error;
/// Data granularity definitions.
pub mod interval;
/// Provider traits for fetching market data.
pub mod provider;
/// Request specification, normalization, and cache keys.
pub mod request;
/// Retry policy with bounded exponential backoff.
pub mod retry;
/// Core data types (Symbol, OhlcvBar, Dataset).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::DatasetCache;
pub use error::{DataError, Result};
pub use interval::Interval;
pub use provider::{DataProvider, PriceDataProvider};
pub use request::{CacheKey, NormalizedRequest, RequestSpec};
pub use retry::RetryPolicy;
pub use types::{Dataset, OhlcvBar, Symbol};
