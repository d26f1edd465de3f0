use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::entry::CacheEntry;
use crate::error::StorageError;
use crate::utils::{Clock, build_cache_key, strip_cache_key};

/// Suffix of the key written and immediately deleted by the availability probe.
///
/// The probe key is `{prefix}:__probe__`, which no `{prefix}::{key}` can equal.
const PROBE_SUFFIX: &str = ":__probe__";

/// A namespaced entry found while scanning the backend.
pub(crate) struct ScannedEntry {
    /// Full storage key, including the prefix.
    pub storage_key: String,
    /// Raw stored string.
    pub raw: String,
    /// Parsed envelope, `None` if corrupt.
    pub entry: Option<CacheEntry<Value>>,
}

/// Durable key-value persistence under a private namespace.
///
/// Every operation degrades instead of failing: an unavailable or full
/// backend turns reads into misses and writes into `false`. Nothing outside
/// `{prefix}::` is ever touched.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn StorageBackend>,
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn StorageBackend>, prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        CacheStore {
            backend,
            prefix: prefix.into(),
            clock,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Probe the backend with a throwaway write/delete.
    fn probe(&self) -> Result<(), StorageError> {
        let probe_key = format!("{}{}", self.prefix, PROBE_SUFFIX);
        self.backend.set_item(&probe_key, "1")?;
        self.backend.remove_item(&probe_key)
    }

    /// Whether the backend currently accepts reads and writes.
    ///
    /// Returns `false` when the backend is disabled, full, or unreachable.
    pub fn is_available(&self) -> bool {
        match self.probe() {
            Ok(()) => true,
            Err(e) => {
                debug!(backend = self.backend.name(), error = %e, "storage probe failed");
                false
            }
        }
    }

    /// Serialize and persist `entry` under `key`.
    ///
    /// On quota exhaustion, evicts every expired entry and retries once.
    /// Returns `false` if the entry could not be persisted.
    pub fn write<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) -> bool {
        match self.probe() {
            // A full store still gets the eviction-and-retry cycle below.
            Ok(()) | Err(StorageError::QuotaExceeded) => {}
            Err(e) => {
                debug!(key, error = %e, "storage unavailable, skipping write");
                return false;
            }
        }

        let serialized = match serde_json::to_string(entry) {
            Ok(s) => s,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize cache entry");
                return false;
            }
        };

        let storage_key = build_cache_key(&self.prefix, key);
        match self.backend.set_item(&storage_key, &serialized) {
            Ok(()) => true,
            Err(StorageError::QuotaExceeded) => {
                let evicted = self.evict_stale(self.now_ms());
                debug!(key, evicted, "storage quota exceeded, retrying after eviction");
                match self.backend.set_item(&storage_key, &serialized) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(key, bytes = serialized.len(), error = %e, "cache write abandoned after eviction");
                        false
                    }
                }
            }
            Err(e) => {
                warn!(key, error = %e, "cache write failed");
                false
            }
        }
    }

    /// Read the entry for `key`.
    ///
    /// Returns `None` on a missing key, an unavailable backend, or unreadable
    /// data. An envelope that is not valid JSON is removed; a payload that
    /// does not match `T` is left in place.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        if !self.is_available() {
            return None;
        }

        let storage_key = build_cache_key(&self.prefix, key);
        let raw = match self.backend.get_item(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<Value> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "removing corrupt cache entry");
                let _ = self.backend.remove_item(&storage_key);
                return None;
            }
        };

        let CacheEntry {
            data,
            created_at,
            fresh_until,
            stale_until,
            entry_type,
        } = entry;
        match serde_json::from_value::<T>(data) {
            Ok(data) => Some(CacheEntry {
                data,
                created_at,
                fresh_until,
                stale_until,
                entry_type,
            }),
            Err(e) => {
                debug!(key, error = %e, "cached data does not match requested type");
                None
            }
        }
    }

    /// Best-effort delete.
    pub fn remove(&self, key: &str) {
        let storage_key = build_cache_key(&self.prefix, key);
        if let Err(e) = self.backend.remove_item(&storage_key) {
            debug!(key, error = %e, "cache remove failed");
        }
    }

    /// Delete every entry under the namespace. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        let removed = self.remove_where(|_| true);
        debug!(prefix = %self.prefix, removed, "cleared cache namespace");
        removed
    }

    /// Enumerate namespaced storage keys. Empty when the backend is unavailable.
    pub(crate) fn storage_keys(&self) -> Vec<String> {
        let scan_prefix = build_cache_key(&self.prefix, "");
        match self.backend.keys_with_prefix(&scan_prefix) {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| strip_cache_key(&self.prefix, k).is_some())
                .collect(),
            Err(e) => {
                debug!(error = %e, "cache key enumeration failed");
                Vec::new()
            }
        }
    }

    /// Read and parse every namespaced entry. Unreadable keys are skipped.
    pub(crate) fn scan(&self) -> Vec<ScannedEntry> {
        self.storage_keys()
            .into_iter()
            .filter_map(|storage_key| {
                let raw = self.backend.get_item(&storage_key).ok().flatten()?;
                let entry = serde_json::from_str(&raw).ok();
                Some(ScannedEntry {
                    storage_key,
                    raw,
                    entry,
                })
            })
            .collect()
    }

    /// Remove every scanned entry matching `pred`. Returns how many were removed.
    pub(crate) fn remove_where(&self, pred: impl Fn(&ScannedEntry) -> bool) -> usize {
        self.scan()
            .into_iter()
            .filter(|scanned| pred(scanned))
            .filter(|scanned| self.backend.remove_item(&scanned.storage_key).is_ok())
            .count()
    }
}
