use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;

use crate::error::{BoxError, CacheError};
use crate::invalidation::CacheStats;
use crate::policy::{Classified, FreshnessPolicy};
use crate::store::CacheStore;
use crate::swr::SwrCache;

/// High-level cache API combining the namespaced store, the policy table,
/// and stale-while-revalidate reads.
///
/// Construct one with [`AppCacheBuilder`](crate::AppCacheBuilder) and pass it
/// (or a clone; clones share state) to whatever needs it.
#[derive(Clone)]
pub struct AppCache {
    swr_cache: SwrCache,
}

impl AppCache {
    pub(crate) fn from_swr(swr_cache: SwrCache) -> Self {
        AppCache { swr_cache }
    }

    fn store(&self) -> &CacheStore {
        self.swr_cache.store()
    }

    /// Stale-while-revalidate: get the cached value or load it with `fetch`.
    ///
    /// # Arguments
    /// * `key` - The cache key (non-empty)
    /// * `entry_type` - Selects the freshness policy; `None` uses the default
    /// * `fetch` - Loads the value on a miss, or in the background when stale
    ///
    /// Background refreshes run on the current Tokio runtime. Outside a
    /// runtime they run on a short-lived dedicated thread.
    ///
    /// # Example
    /// ```ignore
    /// let sales: DailySales = cache
    ///     .swr("sales:2026-10-16", Some("today_sales"), move || async move {
    ///         backend.rpc("get_today_sales").await
    ///     })
    ///     .await?;
    /// ```
    pub async fn swr<T, F, Fut, E>(&self, key: &str, entry_type: Option<&str>, fetch: F) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        self.swr_cache.get(key, entry_type, fetch, None).await
    }

    /// Like [`swr`](Self::swr), and calls `on_update` with the refreshed value
    /// once a background revalidation succeeds.
    pub async fn swr_with_update<T, F, Fut, E, U>(
        &self,
        key: &str,
        entry_type: Option<&str>,
        fetch: F,
        on_update: U,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
        U: FnOnce(T) + Send + 'static,
    {
        self.swr_cache
            .get(key, entry_type, fetch, Some(Box::new(on_update)))
            .await
    }

    /// Write `value` under `key`. Returns `false` if it could not be persisted.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, entry_type: Option<&str>) -> bool {
        self.swr_cache.set(key, value, entry_type)
    }

    /// Return any cached data for `key`, however old.
    pub fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.store().read(key).map(|entry| entry.data)
    }

    /// Classify the entry for `key` at the current time.
    pub fn peek<T: DeserializeOwned>(&self, key: &str) -> Classified<T> {
        self.swr_cache.peek(key)
    }

    /// Remove the key from the cache.
    pub fn remove(&self, key: &str) {
        self.store().remove(key)
    }

    /// Remove every entry in this cache's namespace.
    pub fn clear_all(&self) -> usize {
        self.store().clear_all()
    }

    /// Remove every entry written with `entry_type`.
    pub fn invalidate_by_type(&self, entry_type: &str) -> usize {
        self.store().invalidate_by_type(entry_type)
    }

    /// Remove every entry whose key matches `pattern`.
    pub fn invalidate_by_pattern(&self, pattern: &Regex) -> usize {
        self.store().invalidate_by_pattern(pattern)
    }

    /// Compile `pattern` and remove every entry whose key matches it.
    pub fn invalidate_matching(&self, pattern: &str) -> Result<usize, CacheError> {
        let pattern = Regex::new(pattern)?;
        Ok(self.invalidate_by_pattern(&pattern))
    }

    /// Remove every entry past its stale window as of `now_ms`.
    pub fn evict_stale(&self, now_ms: i64) -> usize {
        self.store().evict_stale(now_ms)
    }

    /// Remove every entry past its stale window as of now.
    pub fn evict_expired(&self) -> usize {
        self.evict_stale(self.store().now_ms())
    }

    /// Diagnostic snapshot at the current time.
    pub fn stats(&self) -> CacheStats {
        self.store().stats(self.store().now_ms())
    }

    /// Whether the backing store currently accepts reads and writes.
    pub fn is_available(&self) -> bool {
        self.store().is_available()
    }

    /// Policy applied to entries of `entry_type`.
    pub fn durations_for(&self, entry_type: Option<&str>) -> FreshnessPolicy {
        self.swr_cache.policies().durations_for(entry_type)
    }

    pub fn prefix(&self) -> &str {
        self.store().prefix()
    }
}
