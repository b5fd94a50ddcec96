//! Type Bucket Module
//!
//! Per-type carrier map. Each carrier owns a slot whose value is published
//! exactly once through a `OnceCell`, so construction and setup finish
//! before any caller can observe the entry.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::registry::carrier::{CacheCarrier, CarrierId, CarrierRef};
use crate::registry::entry::{Cache, CacheHandle};

// == Slot ==
/// Entry for one carrier inside a bucket.
pub(crate) struct Slot<T> {
    carrier: CarrierRef,
    value: OnceCell<Mutex<CacheHandle<T>>>,
}

impl<T> Slot<T> {
    fn new(carrier: CarrierRef) -> Self {
        Self {
            carrier,
            value: OnceCell::new(),
        }
    }

    /// Current handle, if the entry has been published.
    pub(crate) fn current(&self) -> Option<CacheHandle<T>> {
        self.value.get().map(|handle| handle.lock().clone())
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }

    /// Publishes the value built by `make` unless one exists.
    ///
    /// Concurrent callers block until the winning `make` returns. Returns the
    /// current handle and whether this call created it.
    pub(crate) fn get_or_init<F>(&self, make: F) -> (CacheHandle<T>, bool)
    where
        F: FnOnce() -> CacheHandle<T>,
    {
        let mut created = false;
        let cell = self.value.get_or_init(|| {
            created = true;
            Mutex::new(make())
        });
        (cell.lock().clone(), created)
    }

    /// Fallible form of [`Slot::get_or_init`]. On error nothing is published.
    pub(crate) fn get_or_try_init<F, E>(&self, make: F) -> Result<(CacheHandle<T>, bool), E>
    where
        F: FnOnce() -> Result<CacheHandle<T>, E>,
    {
        let mut created = false;
        let cell = self.value.get_or_try_init(|| {
            let handle = make()?;
            created = true;
            Ok(Mutex::new(handle))
        })?;
        Ok((cell.lock().clone(), created))
    }

    /// Replaces the published handle. The slot must already be ready.
    pub(crate) fn replace(&self, handle: CacheHandle<T>) {
        if let Some(current) = self.value.get() {
            *current.lock() = handle;
        }
    }
}

// == Erased Bucket ==
/// Type-erased view of a bucket, used for operations spanning every type.
pub(crate) trait ErasedBucket: Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Number of published entries.
    fn len(&self) -> usize;

    /// Removes the carrier's entry. Returns true if a published entry went away.
    fn remove_carrier(&self, id: CarrierId) -> bool;

    /// Removes entries whose carrier was dropped. Returns the published count removed.
    fn sweep(&self) -> usize;
}

// == Type Bucket ==
/// Carrier map for a single cache type.
pub(crate) struct TypeBucket<T> {
    slots: Mutex<HashMap<CarrierId, Arc<Slot<T>>, RandomState>>,
}

impl<T: Cache> TypeBucket<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::with_hasher(RandomState::new())),
        }
    }

    /// Finds the carrier's slot, inserting an empty one if absent.
    pub(crate) fn slot<C: CacheCarrier>(&self, carrier: &Arc<C>) -> Arc<Slot<T>> {
        let mut slots = self.slots.lock();
        slots
            .entry(CarrierId::of(carrier))
            .or_insert_with(|| Arc::new(Slot::new(CarrierRef::new(carrier))))
            .clone()
    }

    pub(crate) fn find(&self, id: CarrierId) -> Option<Arc<Slot<T>>> {
        self.slots.lock().get(&id).cloned()
    }

    /// Removes the carrier's slot and returns its handle if it was published.
    pub(crate) fn take(&self, id: CarrierId) -> Option<CacheHandle<T>> {
        let slot = self.slots.lock().remove(&id)?;
        slot.current()
    }
}

impl<T: Cache> ErasedBucket for TypeBucket<T> {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn len(&self) -> usize {
        self.slots.lock().values().filter(|slot| slot.is_ready()).count()
    }

    fn remove_carrier(&self, id: CarrierId) -> bool {
        self.take(id).is_some()
    }

    fn sweep(&self) -> usize {
        let mut removed = 0;
        self.slots.lock().retain(|_, slot| {
            let alive = slot.carrier.is_alive();
            if !alive && slot.is_ready() {
                removed += 1;
            }
            alive
        });
        removed
    }
}
