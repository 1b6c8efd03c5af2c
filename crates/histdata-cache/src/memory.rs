//! In-memory cache implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use histdata_core::{CacheKey, Dataset, DatasetCache, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// Cache entry with the fetch timestamp.
#[derive(Debug, Clone)]
struct CacheEntry {
    dataset: Dataset,
    #[allow(dead_code)]
    fetched_at: DateTime<Utc>,
}

/// Simple in-memory cache for testing and development.
///
/// Data is stored in an `RwLock`-protected `HashMap` and is lost when the
/// cache is dropped. Datasets are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryCache {
    /// Creates a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetCache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Dataset>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => {
                debug!(key = %key, "cache hit");
                Ok(Some(entry.dataset.clone()))
            }
            None => {
                debug!(key = %key, "cache miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &CacheKey, dataset: &Dataset) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.clone(),
            CacheEntry {
                dataset: dataset.clone(),
                fetched_at: Utc::now(),
            },
        );
        debug!(key = %key, bars = dataset.len(), "cached dataset");
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        debug!("cleared all cache entries");
        Ok(())
    }
}
