use std::sync::Arc;
use tracing::info;

use crate::backend::StorageBackend;
use crate::cache::AppCache;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::policy::FreshnessPolicy;
use crate::reporter::{ErrorReporter, TracingReporter};
use crate::store::CacheStore;
use crate::swr::SwrCache;
use crate::utils::{Clock, SystemClock};

/// Builder for creating an [`AppCache`].
///
/// # Example
///
/// ```ignore
/// use app_cache::{AppCacheBuilder, MemoryStorage};
/// use std::sync::Arc;
///
/// let cache = AppCacheBuilder::new(Arc::new(MemoryStorage::default()))
///     .prefix("station_42")
///     .policy("fuel_prices", 30_000, 120_000)
///     .build()?;
/// ```
pub struct AppCacheBuilder {
    backend: Arc<dyn StorageBackend>,
    config: CacheConfig,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl AppCacheBuilder {
    /// Create a new builder over `backend` with the default configuration.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        AppCacheBuilder {
            backend,
            config: CacheConfig::default(),
            reporter: Arc::new(TracingReporter),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the namespace prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Add or replace the policy for `entry_type`.
    ///
    /// Reference rows for other types are kept.
    pub fn policy(mut self, entry_type: impl Into<String>, fresh_ms: i64, stale_ms: i64) -> Self {
        self.config
            .policies
            .insert(entry_type.into(), FreshnessPolicy { fresh_ms, stale_ms });
        self
    }

    /// Set the policy for absent or unknown entry types.
    pub fn default_policy(mut self, fresh_ms: i64, stale_ms: i64) -> Self {
        self.config.default_policy = FreshnessPolicy { fresh_ms, stale_ms };
        self
    }

    /// Coalesce concurrent background revalidations of the same key.
    pub fn dedupe_revalidation(mut self, dedupe: bool) -> Self {
        self.config.dedupe_revalidation = dedupe;
        self
    }

    /// Set the reporter for foreground fetch failures.
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set the clock used for freshness decisions.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration and build the cache.
    pub fn build(self) -> Result<AppCache, CacheError> {
        self.config.validate()?;
        let policies = Arc::new(self.config.policy_table()?);

        info!(
            prefix = %self.config.prefix,
            backend = self.backend.name(),
            dedupe_revalidation = self.config.dedupe_revalidation,
            "building app cache"
        );

        let store = CacheStore::new(self.backend, self.config.prefix, self.clock);
        let swr_cache = SwrCache::new(
            store,
            policies,
            self.reporter,
            self.config.dedupe_revalidation,
        );
        Ok(AppCache::from_swr(swr_cache))
    }
}
