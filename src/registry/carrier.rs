//! Carrier Module
//!
//! Carriers are the objects that own a cache entry. They are identified by
//! the address of their `Arc` allocation, never by value.

use std::sync::{Arc, Weak};

// == Carrier Marker ==
/// Marker for objects that may carry runtime caches.
///
/// Carriers are shared as `Arc<Self>`; two carriers with equal field values
/// are still distinct keys.
pub trait CacheCarrier: Send + Sync + 'static {}

// == Carrier Id ==
/// Reference identity of a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarrierId(usize);

impl CarrierId {
    /// Identity of the given carrier.
    pub fn of<C: CacheCarrier>(carrier: &Arc<C>) -> Self {
        CarrierId(Arc::as_ptr(carrier) as *const () as usize)
    }

    /// Identity of a carrier reached through a plain reference.
    ///
    /// Matches [`CarrierId::of`] when `carrier` lives inside an `Arc`, which
    /// makes it usable from `Drop` where no `Arc` is available.
    pub fn of_ref<C: CacheCarrier>(carrier: &C) -> Self {
        CarrierId(carrier as *const C as *const () as usize)
    }
}

impl<C: CacheCarrier> From<&Arc<C>> for CarrierId {
    fn from(carrier: &Arc<C>) -> Self {
        CarrierId::of(carrier)
    }
}

// == Carrier Ref ==
/// Non-owning back-reference stored next to an entry.
///
/// Holding the `Weak` never keeps the carrier alive, but it does keep the
/// allocation reserved, so no other carrier can reuse its `CarrierId` while
/// the entry exists.
pub(crate) struct CarrierRef {
    handle: Weak<dyn CacheCarrier>,
}

impl CarrierRef {
    pub(crate) fn new<C: CacheCarrier>(carrier: &Arc<C>) -> Self {
        let handle: Weak<C> = Arc::downgrade(carrier);
        Self { handle }
    }

    /// True while at least one strong reference to the carrier exists.
    pub(crate) fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }
}
