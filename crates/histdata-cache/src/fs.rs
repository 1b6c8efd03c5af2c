//! Filesystem cache implementation.
//!
//! One JSON file per cache key under a cache root directory. Entries are
//! written to a temp file and renamed into place, so a reader never observes
//! a half-written entry; two processes racing on one key resolve
//! last-writer-wins. Unreadable entries are treated as misses and removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use histdata_core::{CacheKey, DataError, Dataset, DatasetCache, OhlcvBar, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// On-disk entry format: the dataset bars plus the fetch timestamp.
///
/// `fetched_at` is recorded for observability only; nothing expires by time.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    fetched_at: DateTime<Utc>,
    bars: Vec<OhlcvBar>,
}

/// Filesystem-backed dataset cache.
///
/// The cache root is created lazily on first write, so constructing the
/// cache never touches the disk.
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
}

impl FsCache {
    /// Creates a cache rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the entry path for a key.
    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Removes an unreadable entry, keeping quiet if it is already gone.
    fn discard_entry(&self, path: &Path) {
        if let Err(error) = fs::remove_file(path) {
            if error.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %error, "failed to remove corrupt cache entry");
            }
        }
    }
}

#[async_trait]
impl DatasetCache for FsCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Dataset>> {
        let path = self.entry_path(key);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(key = %key, "cache miss");
                return Ok(None);
            }
            Err(error) => {
                warn!(key = %key, error = %error, "cache read failed, treating as miss");
                return Ok(None);
            }
        };

        match serde_json::from_str::<StoredEntry>(&raw) {
            Ok(entry) => {
                debug!(key = %key, bars = entry.bars.len(), "cache hit");
                Ok(Some(Dataset::from_bars(entry.bars)))
            }
            Err(error) => {
                warn!(key = %key, error = %error, "discarding corrupt cache entry");
                self.discard_entry(&path);
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &CacheKey, dataset: &Dataset) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| DataError::Cache(format!("creating cache root: {e}")))?;

        let entry = StoredEntry {
            fetched_at: Utc::now(),
            bars: dataset.bars().to_vec(),
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| DataError::Cache(format!("encoding cache entry: {e}")))?;

        let path = self.entry_path(key);
        // Temp file lives in the cache root so the rename stays on one
        // filesystem; the pid keeps concurrent processes off each other's
        // temp files.
        let tmp = self.root.join(format!("{key}.json.tmp{}", std::process::id()));
        fs::write(&tmp, json).map_err(|e| DataError::Cache(format!("writing cache entry: {e}")))?;

        if let Err(error) = fs::rename(&tmp, &path) {
            self.discard_entry(&tmp);
            return Err(DataError::Cache(format!("replacing cache entry: {error}")));
        }

        debug!(key = %key, bars = dataset.len(), "cached dataset");
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key = %key, "invalidated cache entry");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(DataError::Cache(format!("removing cache entry: {error}"))),
        }
    }

    async fn clear(&self) -> Result<()> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(DataError::Cache(format!("reading cache root: {error}"))),
        };

        for entry in entries {
            let entry = entry.map_err(|e| DataError::Cache(format!("reading cache root: {e}")))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)
                    .map_err(|e| DataError::Cache(format!("removing cache entry: {e}")))?;
            }
        }

        debug!(root = %self.root.display(), "cleared cache");
        Ok(())
    }
}
