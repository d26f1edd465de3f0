//! Storage backend implementations for the cache library.

pub mod memory;
pub mod metrics;
pub mod moka;
pub mod redis;

pub use self::memory::{MemoryStorage, MemoryStorageConfig};
pub use self::metrics::{MetricsSink, MetricsStorage, StorageMetric, WriteOutcome};
pub use self::moka::{MokaStorage, MokaStorageConfig};
pub use self::redis::{RedisStorage, RedisStorageConfig};
