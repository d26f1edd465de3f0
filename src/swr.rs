use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::entry::CacheEntry;
use crate::error::{BoxError, CacheError};
use crate::policy::{Classified, Freshness, PolicyTable, classify};
use crate::reporter::{ErrorContext, ErrorReporter};
use crate::store::CacheStore;

/// Callback receiving the value fetched by a background revalidation.
pub type UpdateCallback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Keys with a background revalidation in flight.
type RevalidationState = Arc<Mutex<HashSet<String>>>;

/// Removes a key from the in-flight set when the revalidation task ends,
/// including by panic.
struct RevalidationGuard {
    state: RevalidationState,
    key: String,
}

impl Drop for RevalidationGuard {
    fn drop(&mut self) {
        let mut inflight = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        inflight.remove(&self.key);
    }
}

/// Stale-while-revalidate orchestration over a [`CacheStore`].
///
/// A caller never waits on the fetch function while any cached value exists,
/// even an expired one. Concurrent stale reads of one key each spawn their
/// own refresh unless `dedupe_revalidation` is set; the last refresh to
/// finish wins.
#[derive(Clone)]
pub struct SwrCache {
    store: CacheStore,
    policies: Arc<PolicyTable>,
    reporter: Arc<dyn ErrorReporter>,
    /// When set, at most one background revalidation runs per key.
    dedupe_revalidation: bool,
    revalidating: RevalidationState,
}

impl SwrCache {
    pub fn new(
        store: CacheStore,
        policies: Arc<PolicyTable>,
        reporter: Arc<dyn ErrorReporter>,
        dedupe_revalidation: bool,
    ) -> Self {
        SwrCache {
            store,
            policies,
            reporter,
            dedupe_revalidation,
            revalidating: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Read and classify the entry for `key` without fetching.
    pub fn peek<T: DeserializeOwned>(&self, key: &str) -> Classified<T> {
        classify(self.store.read(key), self.store.now_ms())
    }

    /// Write `value` under `key` with timestamps from the policy for `entry_type`.
    ///
    /// Values that serialize to JSON `null` are not written.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, entry_type: Option<&str>) -> bool {
        let data = match serde_json::to_value(value) {
            Ok(Value::Null) => {
                debug!(key, "not caching null value");
                return false;
            }
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize value for cache");
                return false;
            }
        };

        let policy = self.policies.durations_for(entry_type);
        let entry = CacheEntry::new(data, entry_type, policy, self.store.now_ms());
        self.store.write(key, &entry)
    }

    /// Stale-while-revalidate: return cached data or load it with `fetch`.
    ///
    /// - Fresh: return the cached value; `fetch` is not called.
    /// - Stale or expired: return the cached value and run `fetch` in a
    ///   background task. On success the result is cached and passed to
    ///   `on_update`; on failure it is logged.
    /// - Miss: await `fetch`, cache and return its result. A failure is
    ///   reported and returned as [`CacheError::Fetch`].
    ///
    /// Background revalidation runs on the current Tokio runtime. Called from
    /// outside a runtime, it runs on a dedicated thread instead.
    pub async fn get<T, F, Fut, E>(
        &self,
        key: &str,
        entry_type: Option<&str>,
        fetch: F,
        on_update: Option<UpdateCallback<T>>,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        let Classified { state, data } = self.peek::<T>(key);
        match (state, data) {
            (Freshness::Fresh, Some(data)) => {
                debug!(key, "cache hit");
                Ok(data)
            }
            (state, Some(data)) => {
                debug!(key, ?state, "serving stale value, revalidating");
                self.spawn_revalidation(key, entry_type, fetch, on_update);
                Ok(data)
            }
            (_, None) => {
                debug!(key, "cache miss");
                self.load(key, entry_type, fetch).await
            }
        }
    }

    /// Foreground load on the miss path.
    async fn load<T, F, Fut, E>(&self, key: &str, entry_type: Option<&str>, fetch: F) -> Result<T, CacheError>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        match fetch().await {
            Ok(value) => {
                self.set(key, &value, entry_type);
                Ok(value)
            }
            Err(e) => {
                let error = CacheError::fetch(key, e.into());
                self.reporter
                    .report(&error, &ErrorContext::new("app_cache.get", key))
                    .await;
                Err(error)
            }
        }
    }

    /// Spawn a background revalidation task.
    ///
    /// Runs on the current Tokio runtime, or on a dedicated thread with its
    /// own single-threaded runtime when called from outside one.
    fn spawn_revalidation<T, F, Fut, E>(
        &self,
        key: &str,
        entry_type: Option<&str>,
        fetch: F,
        on_update: Option<UpdateCallback<T>>,
    ) where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let guard = if self.dedupe_revalidation {
            let mut inflight = self.revalidating.lock().unwrap_or_else(PoisonError::into_inner);
            if !inflight.insert(key.to_string()) {
                debug!(key, "revalidation already in flight");
                return;
            }
            Some(RevalidationGuard {
                state: Arc::clone(&self.revalidating),
                key: key.to_string(),
            })
        } else {
            None
        };

        let cache = self.clone();
        let key = key.to_string();
        let entry_type = entry_type.map(str::to_string);

        let task = async move {
            let _guard = guard;
            match fetch().await {
                Ok(value) => {
                    cache.set(&key, &value, entry_type.as_deref());
                    debug!(key = %key, "background revalidation complete");
                    if let Some(on_update) = on_update {
                        on_update(value);
                    }
                }
                Err(e) => {
                    let e: BoxError = e.into();
                    warn!(key = %key, error = %e, "background revalidation failed");
                }
            }
        };

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(task);
            return;
        }

        let spawned = std::thread::Builder::new()
            .name("app-cache-revalidate".to_string())
            .spawn(move || {
                match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime.block_on(task),
                    Err(e) => warn!(error = %e, "failed to start revalidation runtime"),
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn revalidation thread");
        }
    }
}
