//! Carrier Cache - A type-indexed runtime cache registry
//!
//! Attaches process-lifetime caches to carrier objects by identity, created
//! lazily with a one-time setup per (cache type, carrier) pair.

pub mod asset;
pub mod config;
pub mod error;
pub mod registry;
pub mod tasks;

pub use asset::{AssetExt, CachedAsset, CarrierExt};
pub use config::Config;
pub use error::{RegistryError, Result};
pub use registry::{Cache, CacheCarrier, CacheHandle, CacheRegistry, CarrierId, RegistryStats};
pub use tasks::spawn_sweep_task;
