//! Carrier Sweep Task
//!
//! Background task that periodically purges cache entries whose carrier
//! has been dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::CacheRegistry;

/// Spawns a background task that periodically sweeps the registry.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps.
///
/// # Arguments
/// * `registry` - Shared reference to the registry
/// * `sweep_interval_secs` - Interval in seconds between sweeps, at least 1
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(CacheRegistry::new());
/// let sweep_handle = spawn_sweep_task(registry.clone(), 30);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(registry: Arc<CacheRegistry>, sweep_interval_secs: u64) -> JoinHandle<()> {
    // Zero would spin the loop
    let sweep_interval_secs = sweep_interval_secs.max(1);
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting carrier sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.sweep();

            if removed > 0 {
                info!("Carrier sweep: removed {} orphaned entries", removed);
            } else {
                debug!("Carrier sweep: no orphaned entries found");
            }
        }
    })
}
