//! app-cache - A persistent stale-while-revalidate (SWR) cache for Rust
//!
//! This library provides a client-side caching layer with:
//! - A namespaced key-value store over a pluggable, possibly unreliable backend
//! - Per-entry-type freshness policies (fresh window, stale window)
//! - Stale-while-revalidate reads with background revalidation
//! - Quota-exceeded recovery by evicting expired entries
//! - Invalidation by type, by key pattern, and of expired entries
//!
//! Storage failures never reach callers: an unavailable or full backend
//! degrades to cache misses. The only error a read returns is a failed
//! fetch when nothing was cached.
//!
//! # Example
//!
//! ```ignore
//! use app_cache::{AppCacheBuilder, MemoryStorage};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = AppCacheBuilder::new(Arc::new(MemoryStorage::default())).build()?;
//!
//!     // Fresh hits return immediately; stale hits return immediately and
//!     // refresh in the background; misses wait for the fetch.
//!     let total: f64 = cache
//!         .swr("sales:today", Some("today_sales"), || async {
//!             Ok::<_, std::io::Error>(1_842.50)
//!         })
//!         .await?;
//!
//!     // After a sale is recorded
//!     cache.invalidate_by_type("today_sales");
//!     Ok(())
//! }
//! ```

mod backend;
mod builder;
mod cache;
mod config;
mod entry;
mod error;
mod invalidation;
mod policy;
mod reporter;
mod store;
pub mod stores;
mod swr;
mod utils;

// Re-export public API
pub use backend::StorageBackend;
pub use builder::AppCacheBuilder;
pub use cache::AppCache;
pub use config::{CacheConfig, DEFAULT_PREFIX};
pub use entry::CacheEntry;
pub use error::{BoxError, CacheError, StorageError};
pub use invalidation::CacheStats;
pub use policy::{
    Classified, DEFAULT_FRESH_MS, DEFAULT_STALE_MS, Freshness, FreshnessPolicy, PolicyTable,
    classify,
};
pub use reporter::{ErrorContext, ErrorReporter, TracingReporter};
pub use store::CacheStore;
pub use stores::memory::{MemoryStorage, MemoryStorageConfig};
pub use stores::metrics::{MetricsSink, MetricsStorage, StorageMetric, WriteOutcome};
pub use stores::moka::{MokaStorage, MokaStorageConfig};
pub use stores::redis::{RedisStorage, RedisStorageConfig};
pub use swr::{SwrCache, UpdateCallback};
pub use utils::{Clock, ManualClock, SystemClock};
