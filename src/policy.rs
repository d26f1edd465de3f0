//! Freshness policies and entry classification.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entry::CacheEntry;
use crate::error::CacheError;

/// Fresh window used when an entry type is absent or unknown: 5 minutes.
pub const DEFAULT_FRESH_MS: i64 = 5 * 60_000;

/// Stale window used when an entry type is absent or unknown: 30 minutes.
pub const DEFAULT_STALE_MS: i64 = 30 * 60_000;

/// Temporal state of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// No entry, or the entry could not be read.
    Miss,
    /// Serve without refreshing.
    Fresh,
    /// Serve, and refresh in the background.
    StaleRevalidate,
    /// Past the stale window. Still served, always refreshed.
    StaleExpired,
}

impl Freshness {
    /// Whether a lookup in this state should trigger a refresh.
    pub fn needs_refresh(self) -> bool {
        !matches!(self, Freshness::Fresh)
    }
}

/// Result of classifying a lookup: the state plus whatever data was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<T> {
    pub state: Freshness,
    pub data: Option<T>,
}

/// Classify an optional entry relative to `now_ms`.
pub fn classify<T>(entry: Option<CacheEntry<T>>, now_ms: i64) -> Classified<T> {
    match entry {
        None => Classified {
            state: Freshness::Miss,
            data: None,
        },
        Some(entry) => Classified {
            state: entry.freshness(now_ms),
            data: Some(entry.data),
        },
    }
}

/// A `(fresh, stale)` duration pair, both measured from the write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessPolicy {
    /// Time in milliseconds until the entry becomes stale.
    pub fresh_ms: i64,
    /// Time in milliseconds until the entry expires completely.
    pub stale_ms: i64,
}

impl FreshnessPolicy {
    /// Create a policy, rejecting pairs that break `0 <= fresh_ms <= stale_ms`.
    pub fn new(fresh_ms: i64, stale_ms: i64) -> Result<Self, CacheError> {
        let policy = FreshnessPolicy { fresh_ms, stale_ms };
        policy.validate("<default>")?;
        Ok(policy)
    }

    pub(crate) fn validate(&self, entry_type: &str) -> Result<(), CacheError> {
        if self.fresh_ms < 0 || self.stale_ms < self.fresh_ms {
            return Err(CacheError::InvalidPolicy {
                entry_type: entry_type.to_string(),
                fresh_ms: self.fresh_ms,
                stale_ms: self.stale_ms,
            });
        }
        Ok(())
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        FreshnessPolicy {
            fresh_ms: DEFAULT_FRESH_MS,
            stale_ms: DEFAULT_STALE_MS,
        }
    }
}

/// Static mapping from entry type to freshness policy.
///
/// The table is fixed once the cache is built; new types are added as rows
/// in configuration, not registered at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    default: FreshnessPolicy,
    types: HashMap<String, FreshnessPolicy>,
}

impl PolicyTable {
    /// A table with only a default policy.
    pub fn new(default: FreshnessPolicy) -> Self {
        PolicyTable {
            default,
            types: HashMap::new(),
        }
    }

    /// Build a table from a default and typed rows, validating every row.
    pub fn from_rows(
        default: FreshnessPolicy,
        rows: impl IntoIterator<Item = (String, FreshnessPolicy)>,
    ) -> Result<Self, CacheError> {
        default.validate("<default>")?;
        let mut types = HashMap::new();
        for (entry_type, policy) in rows {
            policy.validate(&entry_type)?;
            types.insert(entry_type, policy);
        }
        Ok(PolicyTable { default, types })
    }

    /// Policy for `entry_type`, falling back to the default for unknown or absent types.
    pub fn durations_for(&self, entry_type: Option<&str>) -> FreshnessPolicy {
        entry_type
            .and_then(|t| self.types.get(t))
            .copied()
            .unwrap_or(self.default)
    }

    pub fn default_policy(&self) -> FreshnessPolicy {
        self.default
    }

    /// Typed rows, in no particular order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, FreshnessPolicy)> + '_ {
        self.types.iter().map(|(t, p)| (t.as_str(), *p))
    }

    /// Whether `entry_type` has its own row.
    pub fn contains(&self, entry_type: &str) -> bool {
        self.types.contains_key(entry_type)
    }
}

impl Default for PolicyTable {
    /// Reference table for the station dashboard.
    fn default() -> Self {
        let minute = 60_000;
        let rows = [
            ("today_sales", minute, 5 * minute),
            ("recent_sales", minute, 5 * minute),
            ("dashboard_stats", 2 * minute, 10 * minute),
            ("credit_summary", 5 * minute, 30 * minute),
            ("expenses", 5 * minute, 30 * minute),
            ("day_closing", 10 * minute, 60 * minute),
            ("staff_roles", 30 * minute, 120 * minute),
            ("station_settings", 60 * minute, 24 * 60 * minute),
        ];
        PolicyTable {
            default: FreshnessPolicy::default(),
            types: rows
                .into_iter()
                .map(|(t, fresh_ms, stale_ms)| (t.to_string(), FreshnessPolicy { fresh_ms, stale_ms }))
                .collect(),
        }
    }
}
