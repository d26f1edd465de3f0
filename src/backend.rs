use crate::error::StorageError;

/// A backend is the persistent key-value surface the cache writes through to.
///
/// Backends are synchronous and string-valued, shaped after browser
/// `localStorage`: any call may fail because the store is disabled, full,
/// or unreachable. The cache catches every such failure and degrades to
/// miss/no-op behavior, so implementations should report errors rather
/// than panic.
///
/// The backend is shared with unrelated state; the cache only ever touches
/// keys under its own prefix.
pub trait StorageBackend: Send + Sync {
    /// A name for metrics/tracing.
    ///
    /// # Example
    /// - "memory"
    /// - "redis"
    fn name(&self) -> &'static str;

    /// Return the stored string, or `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value as a whole.
    ///
    /// Must return [`StorageError::QuotaExceeded`] when the write does not fit.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Enumerate every key in the store.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Enumerate keys starting with `prefix`.
    ///
    /// Backends that can filter server-side should override this.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}
