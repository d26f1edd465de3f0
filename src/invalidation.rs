//! Explicit and opportunistic removal of cache entries.
//!
//! There is no timer-driven reaper. Expired entries stay in the backend until
//! a write hits the quota, a caller runs [`CacheStore::evict_stale`], or they
//! are invalidated or overwritten.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::policy::Freshness;
use crate::store::CacheStore;
use crate::utils::strip_cache_key;

/// Diagnostic snapshot of the cache namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of namespaced entries, corrupt ones included.
    pub entries: usize,
    /// Sum of key and value lengths in bytes.
    pub approx_size_bytes: usize,
    /// Entries past `fresh_until` but within `stale_until`.
    pub stale_count: usize,
    /// Entries past `stale_until`, plus corrupt entries.
    pub expired_count: usize,
}

impl CacheStore {
    /// Remove every entry stored with `entry_type`.
    pub fn invalidate_by_type(&self, entry_type: &str) -> usize {
        let removed = self.remove_where(|scanned| {
            scanned
                .entry
                .as_ref()
                .and_then(|e| e.entry_type.as_deref())
                == Some(entry_type)
        });
        debug!(entry_type, removed, "invalidated cache entries by type");
        removed
    }

    /// Remove every entry whose key (without the namespace) matches `pattern`.
    pub fn invalidate_by_pattern(&self, pattern: &Regex) -> usize {
        let prefix = self.prefix().to_string();
        let removed = self.remove_where(|scanned| {
            strip_cache_key(&prefix, &scanned.storage_key).is_some_and(|key| pattern.is_match(key))
        });
        debug!(pattern = pattern.as_str(), removed, "invalidated cache entries by pattern");
        removed
    }

    /// Remove every entry with `stale_until < now_ms`, plus unparseable ones.
    pub fn evict_stale(&self, now_ms: i64) -> usize {
        let removed = self.remove_where(|scanned| {
            scanned
                .entry
                .as_ref()
                .is_none_or(|e| e.stale_until < now_ms)
        });
        if removed > 0 {
            debug!(removed, "evicted expired cache entries");
        }
        removed
    }

    /// Snapshot of the namespace at `now_ms`. Never mutates the store.
    pub fn stats(&self, now_ms: i64) -> CacheStats {
        self.scan()
            .into_iter()
            .fold(CacheStats::default(), |mut stats, scanned| {
                stats.entries += 1;
                stats.approx_size_bytes += scanned.storage_key.len() + scanned.raw.len();
                match scanned.entry.map(|e| e.freshness(now_ms)) {
                    Some(Freshness::StaleRevalidate) => stats.stale_count += 1,
                    Some(Freshness::StaleExpired) | None => stats.expired_count += 1,
                    Some(Freshness::Fresh) | Some(Freshness::Miss) => {}
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StorageBackend;
    use crate::entry::CacheEntry;
    use crate::policy::FreshnessPolicy;
    use crate::stores::memory::MemoryStorage;
    use crate::utils::ManualClock;
    use std::sync::Arc;

    fn setup() -> (CacheStore, Arc<MemoryStorage>) {
        let backend = Arc::new(MemoryStorage::default());
        let store = CacheStore::new(backend.clone(), "app_cache", Arc::new(ManualClock::new(0)));
        (store, backend)
    }

    fn put(store: &CacheStore, key: &str, entry_type: Option<&str>, fresh_ms: i64, stale_ms: i64) {
        let policy = FreshnessPolicy::new(fresh_ms, stale_ms).unwrap();
        assert!(store.write(key, &CacheEntry::new(key.to_string(), entry_type, policy, 0)));
    }

    #[test]
    fn test_invalidate_by_type() {
        let (store, _) = setup();
        put(&store, "sales:today", Some("today_sales"), 10, 20);
        put(&store, "sales:yesterday", Some("today_sales"), 10, 20);
        put(&store, "credit:all", Some("credit_summary"), 10, 20);
        put(&store, "untyped", None, 10, 20);

        assert_eq!(store.invalidate_by_type("today_sales"), 2);
        assert!(store.read::<String>("sales:today").is_none());
        assert!(store.read::<String>("sales:yesterday").is_none());
        assert!(store.read::<String>("credit:all").is_some());
        assert!(store.read::<String>("untyped").is_some());
    }

    #[test]
    fn test_invalidate_by_pattern_matches_unprefixed_key() {
        let (store, backend) = setup();
        put(&store, "sales:2026-10-15", None, 10, 20);
        put(&store, "sales:2026-10-16", None, 10, 20);
        put(&store, "expenses:2026-10-16", None, 10, 20);
        backend.set_item("sales:foreign", "untouched").unwrap();

        let pattern = Regex::new("^sales:").unwrap();
        assert_eq!(store.invalidate_by_pattern(&pattern), 2);
        assert!(store.read::<String>("expenses:2026-10-16").is_some());
        assert!(backend.get_item("sales:foreign").unwrap().is_some());

        // The namespace itself is not part of the matched text
        let pattern = Regex::new("^app_cache").unwrap();
        assert_eq!(store.invalidate_by_pattern(&pattern), 0);
    }

    #[test]
    fn test_evict_stale_keeps_revalidating_entries() {
        let (store, _) = setup();
        put(&store, "fresh", None, 1_000, 2_000);
        put(&store, "stale", None, 100, 1_000);
        put(&store, "expired", None, 10, 20);
        put(&store, "boundary", None, 10, 500);

        // At t=500: "expired" is past stale_until, "boundary" sits exactly on it
        assert_eq!(store.evict_stale(500), 1);
        assert!(store.read::<String>("expired").is_none());
        assert!(store.read::<String>("stale").is_some());
        assert!(store.read::<String>("boundary").is_some());
        assert!(store.read::<String>("fresh").is_some());
    }

    #[test]
    fn test_evict_stale_reclaims_corrupt_entries() {
        let (store, backend) = setup();
        put(&store, "fresh", None, 1_000, 2_000);
        backend.set_item("app_cache::corrupt", "{truncated").unwrap();
        backend.set_item("corrupt_foreign", "{truncated").unwrap();

        assert_eq!(store.stats(0).expired_count, 1);
        assert_eq!(store.evict_stale(0), 1);
        assert_eq!(store.stats(0).expired_count, 0);
        assert!(backend.get_item("app_cache::corrupt").unwrap().is_none());
        assert!(backend.get_item("corrupt_foreign").unwrap().is_some());
        assert!(store.read::<String>("fresh").is_some());
    }

    #[test]
    fn test_stats_counts_states_and_tolerates_corruption() {
        let (store, backend) = setup();
        put(&store, "fresh", None, 1_000, 2_000);
        put(&store, "stale", None, 100, 1_000);
        put(&store, "expired", None, 10, 20);
        backend.set_item("app_cache::corrupt", "not json").unwrap();
        backend.set_item("unrelated", "ignored").unwrap();

        let stats = store.stats(500);
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.stale_count, 1);
        assert_eq!(stats.expired_count, 2);
        assert!(stats.approx_size_bytes > 0);

        // Stats never mutate: the corrupt entry is still there
        assert!(backend.get_item("app_cache::corrupt").unwrap().is_some());
        assert_eq!(store.stats(500), stats);
    }
}
