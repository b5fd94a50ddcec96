//! Cache Entry Module
//!
//! Defines the cache payload capability and the shared handle returned for
//! each (type, carrier) entry.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// == Cache Marker ==
/// Marker for types usable as a cache payload.
///
/// A payload only has to be default-constructible. The registry never
/// inspects its contents.
///
/// ```
/// use carrier_cache::Cache;
///
/// #[derive(Default)]
/// struct Counter {
///     n: i64,
/// }
///
/// impl Cache for Counter {}
/// ```
pub trait Cache: Default + Send + Sync + 'static {}

// == Cache Handle ==
/// Shared handle to the instance stored for one (type, carrier) entry.
///
/// Clones point at the same instance, so a mutation through any clone is
/// seen by every later lookup of the entry until it is replaced by `set`.
pub struct CacheHandle<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> CacheHandle<T> {
    // == Constructor ==
    /// Wraps a value in a new handle.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Locks the instance for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    /// Locks the instance for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    /// Returns true if both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> CacheHandle<T> {
    /// Returns a copy of the current value.
    pub fn snapshot(&self) -> T {
        self.inner.read().clone()
    }
}

impl<T> Clone for CacheHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for CacheHandle<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheHandle").field(&*self.inner.read()).finish()
    }
}
