#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/histdata/histdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Unified interface for fetching historical market data.
//!
//! This crate re-exports the core types, cache backends, and provider
//! implementations, and provides the [`Fetcher`] pipeline that ties them
//! together: normalize the request, consult the cache, run the remote call
//! under the retry policy, and store the result.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance provider (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use histdata::{Fetcher, FsCache, Interval, RequestSpec, YahooProvider};
//!
//! #[tokio::main]
//! async fn main() -> histdata::Result<()> {
//!     let fetcher = Fetcher::new(Arc::new(YahooProvider::new()))
//!         .with_cache(Arc::new(FsCache::new("./cache/histdata")));
//!
//!     let spec = RequestSpec::new("AAPL", Interval::Daily);
//!     let dataset = fetcher.fetch(&spec).await?;
//!     println!("{} bars", dataset.len());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use histdata_core::*;

// Cache implementations
pub use histdata_cache::{FsCache, InMemoryCache, NoopCache};

// Providers
#[cfg(feature = "yahoo")]
pub use histdata_yahoo::YahooProvider;

mod fetcher;
pub use fetcher::Fetcher;
