//! Metrics middleware for storage backends.
//!
//! This module provides a `MetricsStorage` wrapper that emits metrics for all
//! backend operations (reads, writes, removes, scans) to a user-provided sink.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use app_cache::{AppCacheBuilder, MemoryStorage, StorageBackend};
//! use app_cache::stores::metrics::{MetricsSink, MetricsStorage};
//!
//! let sink = Arc::new(MyMetricsSink::new());
//! let inner: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::default());
//! let backend = Arc::new(MetricsStorage::new(inner, sink.clone()));
//!
//! // Use in AppCache - metrics emitted automatically
//! let cache = AppCacheBuilder::new(backend).build()?;
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Outcome of a write as seen by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Ok,
    QuotaExceeded,
    Failed,
}

/// Metrics emitted by the MetricsStorage wrapper.
#[derive(Debug, Clone)]
pub enum StorageMetric {
    /// Emitted on every `get_item`.
    Read {
        /// The storage key that was read.
        key: String,
        /// Whether a value was found. Errors count as misses.
        hit: bool,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the backend (from StorageBackend::name()).
        tier: String,
    },
    /// Emitted on every `set_item`.
    Write {
        /// The storage key that was written.
        key: String,
        /// Size of the written value in bytes.
        bytes: usize,
        outcome: WriteOutcome,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the backend (from StorageBackend::name()).
        tier: String,
    },
    /// Emitted on every `remove_item`.
    Remove {
        /// The storage key that was removed.
        key: String,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the backend (from StorageBackend::name()).
        tier: String,
    },
    /// Emitted on every key enumeration.
    Scan {
        /// Prefix filter, if any.
        prefix: Option<String>,
        /// Number of keys returned (0 on error).
        key_count: usize,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the backend (from StorageBackend::name()).
        tier: String,
    },
}

/// Trait for receiving storage metrics.
///
/// Implement this trait to collect metrics from `MetricsStorage`.
///
/// # Example
///
/// ```ignore
/// use std::sync::Mutex;
/// use async_trait::async_trait;
/// use app_cache::stores::metrics::{MetricsSink, StorageMetric};
///
/// struct BufferedSink {
///     buffer: Mutex<Vec<StorageMetric>>,
/// }
///
/// #[async_trait]
/// impl MetricsSink for BufferedSink {
///     fn emit(&self, metric: StorageMetric) {
///         self.buffer.lock().unwrap().push(metric);
///     }
///
///     async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         // Send buffered metrics to your backend
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Emit a single metric.
    ///
    /// This is called synchronously in the hot path of storage operations.
    /// Implementations should be fast (e.g., buffer metrics in memory).
    fn emit(&self, metric: StorageMetric);

    /// Flush any buffered metrics.
    ///
    /// Called when the caller wants to ensure all metrics are persisted.
    /// This is typically called at shutdown or at periodic intervals.
    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A backend wrapper that emits metrics for all operations.
///
/// `MetricsStorage` wraps any `StorageBackend` and reports its name as
/// the inner backend's, so it is transparent in logs.
pub struct MetricsStorage {
    inner: Arc<dyn StorageBackend>,
    sink: Arc<dyn MetricsSink>,
    tier_name: String,
}

impl MetricsStorage {
    /// Create a new MetricsStorage wrapping the given backend.
    ///
    /// # Arguments
    /// * `inner` - The backend to wrap
    /// * `sink` - The metrics sink to emit metrics to
    pub fn new(inner: Arc<dyn StorageBackend>, sink: Arc<dyn MetricsSink>) -> Self {
        let tier_name = inner.name().to_string();
        MetricsStorage {
            inner,
            sink,
            tier_name,
        }
    }

    /// Get a reference to the metrics sink.
    pub fn sink(&self) -> &Arc<dyn MetricsSink> {
        &self.sink
    }

    fn elapsed_ms(start: Instant) -> f64 {
        start.elapsed().as_secs_f64() * 1000.0
    }

    fn emit_scan(&self, prefix: Option<&str>, result: &Result<Vec<String>, StorageError>, start: Instant) {
        self.sink.emit(StorageMetric::Scan {
            prefix: prefix.map(str::to_string),
            key_count: result.as_ref().map(Vec::len).unwrap_or(0),
            latency_ms: Self::elapsed_ms(start),
            tier: self.tier_name.clone(),
        });
    }
}

impl StorageBackend for MetricsStorage {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let start = Instant::now();
        let result = self.inner.get_item(key);

        self.sink.emit(StorageMetric::Read {
            key: key.to_string(),
            hit: matches!(result, Ok(Some(_))),
            latency_ms: Self::elapsed_ms(start),
            tier: self.tier_name.clone(),
        });

        result
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let start = Instant::now();
        let result = self.inner.set_item(key, value);

        let outcome = match &result {
            Ok(()) => WriteOutcome::Ok,
            Err(StorageError::QuotaExceeded) => WriteOutcome::QuotaExceeded,
            Err(_) => WriteOutcome::Failed,
        };

        self.sink.emit(StorageMetric::Write {
            key: key.to_string(),
            bytes: value.len(),
            outcome,
            latency_ms: Self::elapsed_ms(start),
            tier: self.tier_name.clone(),
        });

        result
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let start = Instant::now();
        let result = self.inner.remove_item(key);

        self.sink.emit(StorageMetric::Remove {
            key: key.to_string(),
            latency_ms: Self::elapsed_ms(start),
            tier: self.tier_name.clone(),
        });

        result
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let start = Instant::now();
        let result = self.inner.keys();
        self.emit_scan(None, &result, start);
        result
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let start = Instant::now();
        let result = self.inner.keys_with_prefix(prefix);
        self.emit_scan(Some(prefix), &result, start);
        result
    }
}
