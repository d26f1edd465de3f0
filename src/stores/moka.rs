use moka::sync::Cache;
use std::time::Duration;

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Configuration for MokaStorage.
#[derive(Debug, Clone)]
pub struct MokaStorageConfig {
    /// Maximum total weight in bytes (`key.len() + value.len()` per item).
    pub max_capacity_bytes: u64,

    /// Time to live: items are dropped this long after insertion.
    /// `None` leaves expiry entirely to the cache's own timestamps.
    pub time_to_live: Option<Duration>,

    /// Time to idle: items are dropped if not accessed within this duration.
    pub time_to_idle: Option<Duration>,
}

impl Default for MokaStorageConfig {
    fn default() -> Self {
        MokaStorageConfig {
            max_capacity_bytes: 5 * 1024 * 1024,
            time_to_live: None,
            time_to_idle: None,
        }
    }
}

/// Bounded in-process string store using Moka.
///
/// Moka makes room on its own (TinyLFU admission), so this backend never
/// reports [`StorageError::QuotaExceeded`]; an over-capacity write may instead
/// push out other items, including ones outside the cache namespace.
pub struct MokaStorage {
    cache: Cache<String, String>,
}

impl MokaStorage {
    /// Create a new MokaStorage with the given configuration.
    ///
    /// # Example
    /// ```ignore
    /// let config = MokaStorageConfig {
    ///     max_capacity_bytes: 1024 * 1024,
    ///     time_to_live: Some(Duration::from_secs(24 * 3600)),
    ///     time_to_idle: None,
    /// };
    /// let storage = MokaStorage::new(config);
    /// ```
    pub fn new(config: MokaStorageConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity_bytes)
            .weigher(|k: &String, v: &String| {
                u32::try_from(k.len() + v.len()).unwrap_or(u32::MAX)
            });

        if let Some(ttl) = config.time_to_live {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.time_to_idle {
            builder = builder.time_to_idle(tti);
        }

        MokaStorage {
            cache: builder.build(),
        }
    }

    /// Get cache statistics (for monitoring/debugging).
    pub fn stats(&self) -> (u64, u64) {
        self.cache.run_pending_tasks();
        (self.cache.entry_count(), self.cache.weighted_size())
    }
}

impl Default for MokaStorage {
    fn default() -> Self {
        MokaStorage::new(MokaStorageConfig::default())
    }
}

impl StorageBackend for MokaStorage {
    fn name(&self) -> &'static str {
        "moka"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.cache.get(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.cache.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.cache.invalidate(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.cache.iter().map(|(k, _)| k.as_ref().clone()).collect())
    }
}
