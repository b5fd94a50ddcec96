//! Registry Module
//!
//! Type-indexed runtime caches attached to carriers by identity.

mod bucket;
mod carrier;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use carrier::{CacheCarrier, CarrierId};
pub use entry::{Cache, CacheHandle};
pub use stats::RegistryStats;
pub use store::CacheRegistry;
