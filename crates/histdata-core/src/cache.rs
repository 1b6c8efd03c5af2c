//! Cache trait for storing fetched datasets.
//!
//! This module defines the [`DatasetCache`] trait: one dataset per
//! [`CacheKey`], overwritten whenever a fetch for the same key succeeds
//! again. There is no TTL-based expiry; staleness is caller-driven.

use async_trait::async_trait;

use crate::{error::Result, request::CacheKey, types::Dataset};

/// Trait for caching fetched datasets.
///
/// Implementations can store data in various backends (filesystem,
/// in-memory, etc.) to avoid repeated remote calls.
#[async_trait]
pub trait DatasetCache: Send + Sync {
    /// Retrieves the cached dataset for a key.
    ///
    /// Returns `Ok(Some(dataset))` on a hit and `Ok(None)` on a miss.
    /// Unreadable entries count as misses, not errors.
    async fn get(&self, key: &CacheKey) -> Result<Option<Dataset>>;

    /// Stores a dataset under a key, replacing any existing entry.
    ///
    /// The replacement must be atomic: a concurrent reader observes either
    /// the old entry or the new one, never a partial write.
    async fn put(&self, key: &CacheKey, dataset: &Dataset) -> Result<()>;

    /// Removes the entry for a key; no-op when absent.
    async fn invalidate(&self, key: &CacheKey) -> Result<()>;

    /// Removes all cached entries.
    async fn clear(&self) -> Result<()>;
}
