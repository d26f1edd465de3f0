use serde::{Deserialize, Serialize};

use crate::policy::{Freshness, FreshnessPolicy};

/// A cache entry containing a value and its expiration times.
///
/// Serialized with camelCase field names so entries written by other clients
/// of the same store stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The cached value.
    pub data: V,

    /// Unix timestamp in milliseconds at which the entry was written.
    pub created_at: i64,

    /// Unix timestamp in milliseconds.
    /// Up to and including this time the entry is fresh.
    pub fresh_until: i64,

    /// Unix timestamp in milliseconds.
    /// After this time the entry is expired; it is still served as a last
    /// resort but always triggers a refresh.
    pub stale_until: i64,

    /// Classification token selecting the policy and enabling bulk invalidation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
}

impl<V> CacheEntry<V> {
    /// Create an entry written at `now_ms`, with timestamps derived from `policy`.
    ///
    /// Timestamps saturate at `i64::MAX`, so a very long window means "never expires".
    pub fn new(data: V, entry_type: Option<&str>, policy: FreshnessPolicy, now_ms: i64) -> Self {
        CacheEntry {
            data,
            created_at: now_ms,
            fresh_until: now_ms.saturating_add(policy.fresh_ms),
            stale_until: now_ms.saturating_add(policy.stale_ms),
            entry_type: entry_type.map(str::to_string),
        }
    }

    /// Temporal state of this entry at `now_ms`.
    pub fn freshness(&self, now_ms: i64) -> Freshness {
        if now_ms <= self.fresh_until {
            Freshness::Fresh
        } else if now_ms <= self.stale_until {
            Freshness::StaleRevalidate
        } else {
            Freshness::StaleExpired
        }
    }

    /// Check if the entry is still fresh (not yet stale).
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        self.freshness(now_ms) == Freshness::Fresh
    }

    /// Check if the entry is past its stale window.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.stale_until
    }

    /// Swap the payload, keeping the timestamps.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> CacheEntry<U> {
        CacheEntry {
            data: f(self.data),
            created_at: self.created_at,
            fresh_until: self.fresh_until,
            stale_until: self.stale_until,
            entry_type: self.entry_type,
        }
    }
}
