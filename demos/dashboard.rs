//! Example of a station dashboard reading through the cache.
//!
//! A manual clock stands in for wall time so the demo can walk an entry from
//! fresh to stale to expired without sleeping for minutes.

use app_cache::{AppCacheBuilder, ManualClock, MemoryStorage, MemoryStorageConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TodaySales {
    litres: f64,
    revenue_cents: u64,
    version: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StaffRole {
    name: String,
    role: String,
}

/// Pretend RPC layer; every call bumps the version so refreshes are visible.
#[derive(Clone, Default)]
struct Backend {
    calls: Arc<AtomicU64>,
}

impl Backend {
    async fn today_sales(&self) -> Result<TodaySales, std::io::Error> {
        let version = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(TodaySales {
            litres: 4_210.5 + version as f64,
            revenue_cents: 812_000 + version * 100,
            version,
        })
    }

    async fn staff_roles(&self) -> Result<Vec<StaffRole>, std::io::Error> {
        Ok(vec![
            StaffRole {
                name: "Amina".to_string(),
                role: "manager".to_string(),
            },
            StaffRole {
                name: "Tomas".to_string(),
                role: "attendant".to_string(),
            },
        ])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let storage = Arc::new(MemoryStorage::new(MemoryStorageConfig {
        quota_bytes: Some(64 * 1024),
        disabled: false,
    }));
    let cache = AppCacheBuilder::new(storage)
        .prefix("station_42")
        .clock(clock.clone())
        .build()?;
    let backend = Backend::default();

    // Miss: waits for the backend
    let rpc = backend.clone();
    let sales: TodaySales = cache
        .swr("sales:today", Some("today_sales"), move || async move {
            rpc.today_sales().await
        })
        .await?;
    println!("first load: {:?}", sales);

    // Fresh hit: no backend call
    let rpc = backend.clone();
    let sales: TodaySales = cache
        .swr("sales:today", Some("today_sales"), move || async move {
            rpc.today_sales().await
        })
        .await?;
    println!("fresh hit: {:?}", sales);

    // Past the 60s fresh window: stale value now, refreshed value via callback
    clock.advance(90_000);
    let (tx, rx) = tokio::sync::oneshot::channel();
    let rpc = backend.clone();
    let sales: TodaySales = cache
        .swr_with_update(
            "sales:today",
            Some("today_sales"),
            move || async move { rpc.today_sales().await },
            move |fresh: TodaySales| {
                let _ = tx.send(fresh);
            },
        )
        .await?;
    println!("stale hit: {:?}", sales);
    println!("refreshed in background: {:?}", rx.await?);

    let rpc = backend.clone();
    let roles: Vec<StaffRole> = cache
        .swr("staff:roles", Some("staff_roles"), move || async move {
            rpc.staff_roles().await
        })
        .await?;
    println!("staff roles: {:?}", roles);

    println!("stats: {:?}", cache.stats());

    // A sale was recorded: drop every sales entry
    let removed = cache.invalidate_by_type("today_sales");
    println!("invalidated {} today_sales entries", removed);

    let removed = cache.invalidate_matching("^staff:")?;
    println!("invalidated {} staff entries", removed);

    // Jump past every stale window and sweep
    cache.set("sales:yesterday", &sales, Some("today_sales"));
    clock.advance(3_600_000);
    println!("evicted {} expired entries", cache.evict_expired());
    println!("stats: {:?}", cache.stats());
    println!("backend calls: {}", backend.calls.load(Ordering::SeqCst));

    Ok(())
}
