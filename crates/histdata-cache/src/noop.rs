//! No-op cache implementation.

use async_trait::async_trait;
use histdata_core::{CacheKey, Dataset, DatasetCache, Result};
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `Ok(None)` and the mutating methods return `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Creates a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatasetCache for NoopCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Dataset>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    async fn put(&self, _key: &CacheKey, _dataset: &Dataset) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn invalidate(&self, _key: &CacheKey) -> Result<()> {
        trace!("NoopCache: invalidate called, doing nothing");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}
