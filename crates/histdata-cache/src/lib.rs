#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/histdata/histdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache backends for the historical market-data fetcher.
//!
//! This crate provides implementations of the [`DatasetCache`] trait from
//! `histdata-core`:
//!
//! - [`FsCache`] - One JSON file per cache key under a cache root (default)
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// Filesystem cache implementation.
pub mod fs;
/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use histdata_core::DatasetCache;

// Re-export implementations
pub use fs::FsCache;
pub use memory::InMemoryCache;
pub use noop::NoopCache;
