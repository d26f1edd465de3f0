//! Cache configuration.
//!
//! ```ignore
//! let config = CacheConfig::from_json_str(r#"{
//!     "prefix": "station_42",
//!     "policies": {
//!         "today_sales": { "fresh_ms": 60000, "stale_ms": 300000 }
//!     }
//! }"#)?;
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::CacheError;
use crate::policy::{FreshnessPolicy, PolicyTable};

/// Namespace prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "app_cache";

/// Configuration for an [`AppCache`](crate::AppCache).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Namespace for every key the cache writes.
    pub prefix: String,

    /// Policy for absent or unknown entry types.
    pub default_policy: FreshnessPolicy,

    /// Per-type policies, added to (or overriding) the reference rows.
    pub policies: HashMap<String, FreshnessPolicy>,

    /// Coalesce concurrent background revalidations of the same key.
    pub dedupe_revalidation: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            default_policy: FreshnessPolicy::default(),
            policies: HashMap::new(),
            dedupe_revalidation: false,
        }
    }
}

impl CacheConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, CacheError> {
        let config: CacheConfig =
            serde_json::from_str(json).map_err(|e| CacheError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the prefix and every policy row.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.prefix.is_empty() {
            return Err(CacheError::Config("prefix must not be empty".to_string()));
        }
        self.policy_table().map(|_| ())
    }

    /// Build the policy table this configuration describes.
    ///
    /// Configured rows are layered over the reference rows; a configured row
    /// replaces the reference row of the same type.
    pub fn policy_table(&self) -> Result<PolicyTable, CacheError> {
        let mut rows: HashMap<String, FreshnessPolicy> = PolicyTable::default()
            .rows()
            .map(|(t, p)| (t.to_string(), p))
            .collect();
        rows.extend(self.policies.iter().map(|(t, p)| (t.clone(), *p)));
        PolicyTable::from_rows(self.default_policy, rows)
    }
}
