//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the registry.
//!
//! # Tasks
//! - Sweep: Removes cache entries whose carriers have been dropped

mod sweep;

pub use sweep::spawn_sweep_task;
