use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Configuration for MemoryStorage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageConfig {
    /// Maximum total size in bytes (`key.len() + value.len()` per item).
    /// `None` means unbounded.
    pub quota_bytes: Option<usize>,

    /// Start with the store disabled, as in a privacy-mode browser.
    pub disabled: bool,
}

/// Thread-safe in-memory string store using HashMap with RwLock.
///
/// Mirrors the failure modes of browser storage: a byte quota that rejects
/// oversized writes and a switch that makes every call fail. Suitable as the
/// default backend and as a test double.
pub struct MemoryStorage {
    state: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    disabled: AtomicBool,
}

impl MemoryStorage {
    /// Create a new MemoryStorage with the given configuration.
    pub fn new(config: MemoryStorageConfig) -> Self {
        MemoryStorage {
            state: RwLock::new(HashMap::new()),
            quota_bytes: config.quota_bytes,
            disabled: AtomicBool::new(config.disabled),
        }
    }

    /// Enable or disable the store at runtime.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Bytes currently used.
    pub fn used_bytes(&self) -> usize {
        self.state
            .read()
            .map(|state| state.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }

    /// Number of stored items, including keys outside any cache namespace.
    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory storage is disabled".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        MemoryStorage::new(MemoryStorageConfig::default())
    }
}

fn poisoned() -> StorageError {
    StorageError::Other("memory storage lock poisoned".to_string())
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_enabled()?;
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        let mut state = self.state.write().map_err(|_| poisoned())?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = state.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = state.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            if used - replaced + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }

        state.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.check_enabled()?;
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.keys().cloned().collect())
    }
}
