use std::sync::Arc;

/// Boxed error returned by fetch functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for cache operations.
///
/// Storage failures never surface here: the cache degrades to a miss instead.
/// The only error a `get` returns is [`CacheError::Fetch`] on the miss path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Cache keys must be non-empty.
    #[error("cache key must not be empty")]
    EmptyKey,

    /// A freshness policy violated `0 <= fresh_ms <= stale_ms`.
    #[error("invalid policy for '{entry_type}': fresh={fresh_ms}ms stale={stale_ms}ms")]
    InvalidPolicy {
        entry_type: String,
        fresh_ms: i64,
        stale_ms: i64,
    },

    /// An invalidation pattern failed to compile.
    #[error("invalid invalidation pattern: {0}")]
    InvalidPattern(String),

    /// Configuration could not be parsed or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// The fetch function failed and no cached data was available.
    #[error("fetch failed for key '{key}': {source}")]
    Fetch {
        key: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl CacheError {
    /// Create a new fetch error.
    pub fn fetch(key: impl Into<String>, source: BoxError) -> Self {
        CacheError::Fetch {
            key: key.into(),
            source: Arc::from(source),
        }
    }
}

impl From<regex::Error> for CacheError {
    fn from(err: regex::Error) -> Self {
        CacheError::InvalidPattern(err.to_string())
    }
}

/// Failure reported by a [`StorageBackend`](crate::StorageBackend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The store has no room left for the write.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// The store is disabled or cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("storage error: {0}")]
    Other(String),
}

impl StorageError {
    /// Classify a backend error message into the storage error taxonomy.
    ///
    /// Backends that only expose error strings (browser storage shims, Redis
    /// replies) go through here so the matching lives in one place.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();

        if lower.contains("quotaexceeded")
            || lower.contains("ns_error_dom_quota_reached")
            || lower.contains("quota")
            || lower.starts_with("oom")
            || lower.contains("maxmemory")
        {
            return StorageError::QuotaExceeded;
        }

        if lower.contains("securityerror")
            || lower.contains("disabled")
            || lower.contains("access denied")
            || lower.contains("connection refused")
            || lower.contains("broken pipe")
        {
            return StorageError::Unavailable(message.to_string());
        }

        StorageError::Other(message.to_string())
    }
}
