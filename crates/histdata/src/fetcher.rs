//! The fetch pipeline: normalize, consult the cache, fetch with retry, store.

use std::sync::Arc;

use tracing::{debug, warn};

use histdata_cache::NoopCache;
use histdata_core::{
    DataError, Dataset, DatasetCache, NormalizedRequest, PriceDataProvider, RequestSpec, Result,
    RetryPolicy,
};

/// Orchestrates fetching a dataset through the cache and retry layers.
///
/// For each request the fetcher normalizes the spec, derives the cache key,
/// and returns a cached dataset when one exists. On a miss the provider call
/// runs under the [`RetryPolicy`]; a successful result is cached best-effort
/// (a cache write failure is logged and does not affect the returned
/// dataset).
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use histdata::{Fetcher, FsCache, Interval, RequestSpec, YahooProvider};
///
/// let fetcher = Fetcher::new(Arc::new(YahooProvider::new()))
///     .with_cache(Arc::new(FsCache::new("./cache/histdata")));
///
/// let spec = RequestSpec::new("AAPL", Interval::Daily);
/// let dataset = fetcher.fetch(&spec).await?;
/// ```
pub struct Fetcher {
    provider: Arc<dyn PriceDataProvider>,
    cache: Arc<dyn DatasetCache>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("provider", &self.provider.name())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Creates a fetcher for a provider, with no caching and the default
    /// retry policy.
    #[must_use]
    pub fn new(provider: Arc<dyn PriceDataProvider>) -> Self {
        Self {
            provider,
            cache: Arc::new(NoopCache::new()),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the cache backend.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn DatasetCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches the dataset for a request, cache-first.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidRequest`] for an unsupported interval,
    /// the provider's permanent error unchanged, or
    /// [`DataError::FetchFailed`] when retries are exhausted. Cache failures
    /// never surface here; they are logged and treated as misses.
    pub async fn fetch(&self, spec: &RequestSpec) -> Result<Dataset> {
        let request = self.normalize(spec)?;
        let key = request.cache_key();

        match self.cache.get(&key).await {
            Ok(Some(dataset)) => {
                debug!(key = %key, bars = dataset.len(), "cache hit, skipping remote call");
                return Ok(dataset);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(key = %key, error = %error, "cache read failed, treating as miss");
            }
        }

        self.fetch_remote(&request).await
    }

    /// Invalidates any cached entry for the request, then fetches.
    ///
    /// This is the caller-driven staleness control: the cache has no
    /// time-based expiry, a refresh replaces the entry.
    pub async fn fetch_fresh(&self, spec: &RequestSpec) -> Result<Dataset> {
        let request = self.normalize(spec)?;
        let key = request.cache_key();

        if let Err(error) = self.cache.invalidate(&key).await {
            warn!(key = %key, error = %error, "cache invalidation failed");
        }

        self.fetch_remote(&request).await
    }

    fn normalize(&self, spec: &RequestSpec) -> Result<NormalizedRequest> {
        let request = spec.normalized();
        if !self
            .provider
            .supported_intervals()
            .contains(&request.interval)
        {
            return Err(DataError::InvalidRequest(format!(
                "interval {} is not supported by {}",
                request.interval,
                self.provider.name()
            )));
        }
        Ok(request)
    }

    async fn fetch_remote(&self, request: &NormalizedRequest) -> Result<Dataset> {
        debug!(
            symbol = %request.symbol,
            interval = %request.interval,
            start = %request.start,
            end = %request.end,
            "fetching from provider"
        );

        let dataset = self
            .retry
            .execute(|| {
                self.provider.fetch_ohlcv(
                    &request.symbol,
                    request.start,
                    request.end,
                    request.interval,
                )
            })
            .await?;

        let key = request.cache_key();
        if let Err(error) = self.cache.put(&key, &dataset).await {
            warn!(key = %key, error = %error, "failed to cache dataset");
        }

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use histdata_cache::InMemoryCache;
    use histdata_core::{CacheKey, DataProvider, Interval, OhlcvBar, Symbol};

    fn dataset(close: f64) -> Dataset {
        let timestamp = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        Dataset::from_bars(vec![OhlcvBar::new(
            timestamp,
            close - 1.0,
            close + 1.0,
            close - 2.0,
            close,
            1_000_000.0,
        )])
    }

    fn daily_spec() -> RequestSpec {
        RequestSpec::with_range(
            "AAPL",
            Interval::Daily,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(4))
    }

    /// Provider that replays a scripted sequence of results, then keeps
    /// succeeding.
    #[derive(Debug)]
    struct MockProvider {
        intervals: Vec<Interval>,
        script: Mutex<VecDeque<Result<Dataset>>>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn scripted(script: Vec<Result<Dataset>>) -> Self {
            Self {
                intervals: Interval::ALL.to_vec(),
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn daily_only(script: Vec<Result<Dataset>>) -> Self {
            Self {
                intervals: vec![Interval::Daily],
                ..Self::scripted(script)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DataProvider for MockProvider {
        fn name(&self) -> &str {
            "Mock"
        }

        fn description(&self) -> &str {
            "scripted test provider"
        }

        fn supported_intervals(&self) -> &[Interval] {
            &self.intervals
        }
    }

    #[async_trait]
    impl PriceDataProvider for MockProvider {
        async fn fetch_ohlcv(
            &self,
            _symbol: &Symbol,
            _start: NaiveDate,
            _end: NaiveDate,
            _interval: Interval,
        ) -> Result<Dataset> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(dataset(100.0)))
        }
    }

    /// Cache whose reads and writes always fail.
    #[derive(Debug)]
    struct FailingCache;

    #[async_trait]
    impl DatasetCache for FailingCache {
        async fn get(&self, _key: &CacheKey) -> Result<Option<Dataset>> {
            Err(DataError::Cache("read failed".into()))
        }

        async fn put(&self, _key: &CacheKey, _dataset: &Dataset) -> Result<()> {
            Err(DataError::Cache("write failed".into()))
        }

        async fn invalidate(&self, _key: &CacheKey) -> Result<()> {
            Err(DataError::Cache("invalidate failed".into()))
        }

        async fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn first_fetch_calls_remote_second_hits_cache() {
        let provider = Arc::new(MockProvider::scripted(vec![Ok(dataset(101.0))]));
        let fetcher = Fetcher::new(provider.clone()).with_cache(Arc::new(InMemoryCache::new()));
        let spec = daily_spec();

        let first = fetcher.fetch(&spec).await.unwrap();
        assert_eq!(provider.calls(), 1);

        let second = fetcher.fetch(&spec).await.unwrap();
        assert_eq!(provider.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let provider = Arc::new(MockProvider::scripted(vec![Err(
            DataError::SymbolNotFound("NOPE".into()),
        )]));
        let fetcher = Fetcher::new(provider.clone()).with_retry_policy(fast_retry(3));

        let err = fetcher.fetch(&daily_spec()).await.unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn transient_errors_are_retried_until_success() {
        let provider = Arc::new(MockProvider::scripted(vec![
            Err(DataError::Network("timeout".into())),
            Err(DataError::RateLimited {
                provider: "Mock".into(),
                retry_after: None,
            }),
            Ok(dataset(102.0)),
        ]));
        let fetcher = Fetcher::new(provider.clone()).with_retry_policy(fast_retry(3));

        let result = fetcher.fetch(&daily_spec()).await.unwrap();
        assert_eq!(result, dataset(102.0));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_fetch_failed() {
        let provider = Arc::new(MockProvider::scripted(vec![
            Err(DataError::Network("first".into())),
            Err(DataError::Network("last".into())),
        ]));
        let fetcher = Fetcher::new(provider.clone()).with_retry_policy(fast_retry(2));

        match fetcher.fetch(&daily_spec()).await.unwrap_err() {
            DataError::FetchFailed { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*source, DataError::Network(ref msg) if msg == "last"));
            }
            other => panic!("expected FetchFailed, got {other}"),
        }
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn cache_write_failure_still_returns_dataset() {
        let provider = Arc::new(MockProvider::scripted(vec![Ok(dataset(103.0))]));
        let fetcher = Fetcher::new(provider.clone()).with_cache(Arc::new(FailingCache));

        let result = fetcher.fetch(&daily_spec()).await.unwrap();
        assert_eq!(result, dataset(103.0));
    }

    #[tokio::test]
    async fn cache_read_failure_is_treated_as_miss() {
        let provider = Arc::new(MockProvider::scripted(vec![Ok(dataset(104.0))]));
        let fetcher = Fetcher::new(provider.clone()).with_cache(Arc::new(FailingCache));

        let result = fetcher.fetch(&daily_spec()).await.unwrap();
        assert_eq!(result, dataset(104.0));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn unsupported_interval_fails_before_any_remote_call() {
        let provider = Arc::new(MockProvider::daily_only(vec![]));
        let fetcher = Fetcher::new(provider.clone());
        let spec = RequestSpec::new("AAPL", Interval::Hourly);

        let err = fetcher.fetch(&spec).await.unwrap_err();
        assert!(matches!(err, DataError::InvalidRequest(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn fetch_fresh_replaces_cached_entry() {
        let provider = Arc::new(MockProvider::scripted(vec![
            Ok(dataset(105.0)),
            Ok(dataset(106.0)),
        ]));
        let fetcher = Fetcher::new(provider.clone()).with_cache(Arc::new(InMemoryCache::new()));
        let spec = daily_spec();

        assert_eq!(fetcher.fetch(&spec).await.unwrap(), dataset(105.0));
        assert_eq!(fetcher.fetch_fresh(&spec).await.unwrap(), dataset(106.0));
        assert_eq!(provider.calls(), 2);

        // The refreshed entry is what later fetches see.
        assert_eq!(fetcher.fetch(&spec).await.unwrap(), dataset(106.0));
        assert_eq!(provider.calls(), 2);
    }
}
