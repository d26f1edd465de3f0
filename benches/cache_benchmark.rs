use app_cache::{
    AppCache, AppCacheBuilder, MemoryStorage, MemoryStorageConfig, MokaStorage, MokaStorageConfig,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

mod common;
use common::{BenchConfig, FakeBackend, KeyGenerator, SalesSummary};

fn setup_memory() -> AppCache {
    let storage = Arc::new(MemoryStorage::new(MemoryStorageConfig {
        quota_bytes: Some(5 * 1024 * 1024),
        disabled: false,
    }));
    AppCacheBuilder::new(storage)
        .build()
        .expect("valid default config")
}

fn setup_moka() -> AppCache {
    let storage = Arc::new(MokaStorage::new(MokaStorageConfig::default()));
    AppCacheBuilder::new(storage)
        .build()
        .expect("valid default config")
}

async fn load(cache: &AppCache, backend: &FakeBackend, key: &str) -> Option<SalesSummary> {
    let backend = backend.clone();
    let owned_key = key.to_string();
    cache
        .swr(key, Some("today_sales"), move || async move {
            backend.sales_summary(&owned_key).await
        })
        .await
        .ok()
}

/// Benchmark 1: Hot Cache (all fresh hits, pure cache read performance)
fn bench_hot_cache(c: &mut Criterion, config: &BenchConfig) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("hot_cache");
    group.sample_size(config.sample_size);

    let backend = FakeBackend::new(config.rpc_latency_ms);
    let keys = KeyGenerator::new(200).sequential();

    for (name, cache) in [("memory", setup_memory()), ("moka", setup_moka())] {
        // Pre-populate cache
        rt.block_on(async {
            for key in &keys {
                load(&cache, &backend, key).await;
            }
        });

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, keys.len()), &keys, |b, keys| {
            b.to_async(&rt).iter(|| async {
                for key in keys {
                    black_box(load(&cache, &backend, key).await);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark 2: Cold Cache (all misses, origin load performance)
fn bench_cold_cache(c: &mut Criterion, config: &BenchConfig) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cold_cache");
    group.sample_size(config.sample_size.min(20)); // Fewer samples due to origin latency
    group.measurement_time(Duration::from_secs(30));

    let backend = FakeBackend::new(config.rpc_latency_ms);
    let keys = KeyGenerator::new(10).sequential();

    for (name, cache) in [("memory", setup_memory()), ("moka", setup_moka())] {
        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| async {
                cache.clear_all();
                for key in &keys {
                    black_box(load(&cache, &backend, key).await);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark 3: Mixed Workload (80% hits, 20% misses - realistic)
fn bench_mixed_workload(c: &mut Criterion, config: &BenchConfig) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("mixed_workload");
    group.sample_size(config.sample_size.min(50));

    let backend = FakeBackend::new(config.rpc_latency_ms);
    let key_gen = KeyGenerator::new(500);
    let hot_keys: Vec<String> = key_gen.sequential().into_iter().take(400).collect();

    for (name, cache) in [("memory", setup_memory()), ("moka", setup_moka())] {
        rt.block_on(async {
            for key in &hot_keys {
                load(&cache, &backend, key).await;
            }
        });

        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| {
                let keys = key_gen.mixed(0.8);
                let cache = cache.clone();
                let backend = backend.clone();
                async move {
                    for key in keys.iter().take(50) {
                        black_box(load(&cache, &backend, key).await);
                    }
                }
            });
        });
    }

    group.finish();
}

/// Benchmark 4: Invalidation scans over a populated namespace
fn bench_invalidation(c: &mut Criterion, config: &BenchConfig) {
    let mut group = c.benchmark_group("invalidation");
    group.sample_size(config.sample_size);

    let cache = setup_memory();
    let keys = KeyGenerator::new(500).sequential();

    group.bench_function("stats", |b| {
        for key in &keys {
            cache.set(key, &SalesSummary::new(1), Some("today_sales"));
        }
        b.iter(|| black_box(cache.stats()));
    });

    group.bench_function("invalidate_by_type", |b| {
        b.iter(|| {
            for key in keys.iter().take(100) {
                cache.set(key, &SalesSummary::new(1), Some("today_sales"));
            }
            black_box(cache.invalidate_by_type("today_sales"))
        });
    });

    group.finish();
}

fn benches(c: &mut Criterion) {
    let config = BenchConfig::new();
    bench_hot_cache(c, &config);
    bench_cold_cache(c, &config);
    bench_mixed_workload(c, &config);
    bench_invalidation(c, &config);
}

criterion_group!(cache_benches, benches);
criterion_main!(cache_benches);
