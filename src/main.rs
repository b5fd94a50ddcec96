//! Carrier Cache - demo runner
//!
//! Builds a registry from the environment, attaches caches to a handful of
//! carriers, drops one of them and lets the sweep task purge its entries.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carrier_cache::{
    spawn_sweep_task, AssetExt, Cache, CacheCarrier, CacheRegistry, CachedAsset, Config,
};

#[derive(Debug, Default, Clone)]
struct SpawnCache {
    spawned: u32,
    tags: Vec<String>,
}

impl Cache for SpawnCache {}

#[derive(Debug)]
struct Prefab {
    name: String,
}

impl CacheCarrier for Prefab {}

impl CachedAsset for Prefab {
    type Cache = SpawnCache;

    fn cache_setup(&self, cache: &mut SpawnCache) {
        cache.tags.push(self.name.clone());
    }
}

/// Main entry point for the Carrier Cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the registry and start the sweep task
/// 4. Exercise carrier caches, then drop a carrier
/// 5. Wait for one sweep and print statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carrier_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: init_on_set={}, sweep_interval={}s",
        config.init_on_set, config.sweep_interval
    );

    let registry = Arc::new(CacheRegistry::from_config(&config));
    let sweep_handle = spawn_sweep_task(registry.clone(), config.sweep_interval);

    let goblin = Arc::new(Prefab {
        name: "goblin".to_string(),
    });
    let torch = Arc::new(Prefab {
        name: "torch".to_string(),
    });

    for _ in 0..3 {
        goblin.asset_cache_in(&registry).write().spawned += 1;
    }
    torch.set_asset_cache_in(
        &registry,
        SpawnCache {
            spawned: 10,
            tags: vec!["prebuilt".to_string()],
        },
    );

    info!("goblin cache: {:?}", goblin.asset_cache_in(&registry).snapshot());
    info!("torch cache: {:?}", torch.asset_cache_in(&registry).snapshot());

    drop(torch);
    info!("Dropped torch, waiting for sweep");
    let wait = Duration::from_secs(config.sweep_interval) + Duration::from_millis(200);
    tokio::time::sleep(wait).await;

    sweep_handle.abort();
    println!("{}", serde_json::to_string_pretty(&registry.stats())?);

    Ok(())
}
