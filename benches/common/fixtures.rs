use app_cache::BoxError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Test data structure for benchmarks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub station_id: u64,
    pub litres: f64,
    pub revenue_cents: u64,
    pub transactions: u32,
}

impl SalesSummary {
    pub fn new(station_id: u64) -> Self {
        Self {
            station_id,
            litres: station_id as f64 * 12.5,
            revenue_cents: station_id * 1_999,
            transactions: (station_id % 500) as u32,
        }
    }
}

/// Simulated remote backend with configurable latency
#[derive(Clone)]
pub struct FakeBackend {
    latency_ms: u64,
    call_count: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency_ms,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fetch the sales summary for the station encoded in `key`.
    pub async fn sales_summary(&self, key: &str) -> Result<SalesSummary, BoxError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        // Simulate RPC latency
        tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;

        let station_id = key
            .rsplit(':')
            .next()
            .and_then(|id| id.parse().ok())
            .ok_or("malformed key")?;
        Ok(SalesSummary::new(station_id))
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

/// Generate test keys for different workload patterns
pub struct KeyGenerator {
    num_keys: usize,
}

impl KeyGenerator {
    pub fn new(num_keys: usize) -> Self {
        Self { num_keys }
    }

    /// Generate sequential keys (for cold cache tests)
    pub fn sequential(&self) -> Vec<String> {
        (0..self.num_keys).map(|i| format!("sales:{}", i)).collect()
    }

    /// Generate keys for mixed workload (some hits, some misses)
    pub fn mixed(&self, hit_ratio: f64) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let hot_key_count = (self.num_keys as f64 * hit_ratio) as usize;

        (0..1000)
            .map(|_| {
                if rng.gen_bool(hit_ratio) {
                    format!("sales:{}", rng.gen_range(0..hot_key_count))
                } else {
                    format!("sales:{}", rng.gen_range(hot_key_count..self.num_keys))
                }
            })
            .collect()
    }
}
