//! Cache Registry Module
//!
//! Two-level registry: cache type, then carrier identity, then the shared
//! instance for that pair.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ahash::RandomState;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{BoxError, RegistryError, Result};
use crate::registry::bucket::{ErasedBucket, TypeBucket};
use crate::registry::carrier::{CacheCarrier, CarrierId};
use crate::registry::entry::{Cache, CacheHandle};
use crate::registry::stats::{RegistryStats, StatsCounters};

static GLOBAL: Lazy<CacheRegistry> = Lazy::new(|| CacheRegistry::from_config(&Config::from_env()));

// == Cache Registry ==
/// Runtime cache registry keyed by cache type and carrier identity.
///
/// Each (type, carrier) pair holds at most one instance. The instance is
/// created with `T::default()` on first access and the caller's setup runs
/// on it exactly once, before the entry becomes visible to anyone else.
pub struct CacheRegistry {
    /// Cache type to per-carrier bucket
    buckets: RwLock<HashMap<TypeId, Arc<dyn ErasedBucket>, RandomState>>,
    /// Activity counters
    stats: StatsCounters,
    /// Run setup when `set` creates the entry
    init_on_set: bool,
}

impl CacheRegistry {
    // == Constructor ==
    /// Creates an empty registry with default configuration.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Creates an empty registry from the given configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            buckets: RwLock::new(HashMap::with_hasher(RandomState::new())),
            stats: StatsCounters::default(),
            init_on_set: config.init_on_set,
        }
    }

    // == Global ==
    /// Process-wide registry, created on first access from `Config::from_env`.
    pub fn global() -> &'static CacheRegistry {
        &GLOBAL
    }

    // == Get Or Create ==
    /// Returns the carrier's `T` instance, creating it on first access.
    ///
    /// On creation `on_first_init` runs once on the fresh default instance
    /// before the entry is published. Later calls return the same instance
    /// and never invoke the callback.
    ///
    /// If `T::default()` or the callback panics, nothing is inserted and the
    /// next call starts over. The callback must not request the same
    /// (type, carrier) pair from the registry; it gets the instance directly.
    ///
    /// # Arguments
    /// * `carrier` - The carrier owning the entry
    /// * `on_first_init` - One-time setup for a new entry
    pub fn get_or_create<T, C, F>(&self, carrier: &Arc<C>, on_first_init: F) -> CacheHandle<T>
    where
        T: Cache,
        C: CacheCarrier,
        F: FnOnce(&mut T),
    {
        let slot = self.bucket::<T>().slot(carrier);
        let (handle, created) = slot.get_or_init(|| {
            let mut value = T::default();
            on_first_init(&mut value);
            CacheHandle::new(value)
        });
        self.record_access::<T>(CarrierId::of(carrier), created, true);
        handle
    }

    /// [`get_or_create`](Self::get_or_create) without setup.
    pub fn get_or_default<T, C>(&self, carrier: &Arc<C>) -> CacheHandle<T>
    where
        T: Cache,
        C: CacheCarrier,
    {
        self.get_or_create(carrier, |_: &mut T| {})
    }

    // == Try Get Or Create ==
    /// Like [`get_or_create`](Self::get_or_create) with a fallible setup.
    ///
    /// When the setup fails no entry is inserted and the error is returned as
    /// [`RegistryError::Setup`]; the next call retries from scratch.
    pub fn try_get_or_create<T, C, F, E>(
        &self,
        carrier: &Arc<C>,
        on_first_init: F,
    ) -> Result<CacheHandle<T>>
    where
        T: Cache,
        C: CacheCarrier,
        F: FnOnce(&mut T) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        let slot = self.bucket::<T>().slot(carrier);
        let outcome = slot.get_or_try_init(|| {
            let mut value = T::default();
            on_first_init(&mut value).map_err(|err| RegistryError::setup::<T>(err))?;
            Ok::<_, RegistryError>(CacheHandle::new(value))
        });

        match outcome {
            Ok((handle, created)) => {
                self.record_access::<T>(CarrierId::of(carrier), created, true);
                Ok(handle)
            }
            Err(err) => {
                self.stats.record_setup_failure();
                warn!(carrier = ?CarrierId::of(carrier), "{}", err);
                Err(err)
            }
        }
    }

    // == Set ==
    /// Replaces the carrier's `T` instance with `value`.
    ///
    /// The entry is ensured first, exactly like
    /// [`get_or_create`](Self::get_or_create): for a new entry the default
    /// instance is built and `on_first_init` runs on it before it is
    /// discarded. With `Config::init_on_set` disabled a new entry is
    /// published straight from `value` and the callback is skipped.
    ///
    /// Handles returned earlier keep pointing at the replaced instance.
    pub fn set<T, C, F>(&self, carrier: &Arc<C>, on_first_init: F, value: T)
    where
        T: Cache,
        C: CacheCarrier,
        F: FnOnce(&mut T),
    {
        self.set_shared(carrier, on_first_init, CacheHandle::new(value));
    }

    /// Like [`set`](Self::set), but stores an existing handle so several
    /// carriers can share one pre-built instance.
    pub fn set_shared<T, C, F>(&self, carrier: &Arc<C>, on_first_init: F, handle: CacheHandle<T>)
    where
        T: Cache,
        C: CacheCarrier,
        F: FnOnce(&mut T),
    {
        let slot = self.bucket::<T>().slot(carrier);
        let run_setup = self.init_on_set;

        // A new entry is published directly with `handle`, so no caller can
        // observe the transient default instance.
        let mut pending = Some(handle);
        let (_, created) = slot.get_or_init(|| {
            if run_setup {
                let mut transient = T::default();
                on_first_init(&mut transient);
            }
            pending.take().unwrap_or_default()
        });
        if let Some(handle) = pending {
            slot.replace(handle);
        }
        self.record_access::<T>(CarrierId::of(carrier), created, run_setup);
    }

    // == Lookup ==
    /// Returns the carrier's `T` instance if it exists. Never creates one.
    pub fn get<T: Cache>(&self, carrier: impl Into<CarrierId>) -> Option<CacheHandle<T>> {
        self.existing_bucket::<T>()?.find(carrier.into())?.current()
    }

    /// Returns true if the carrier has a `T` entry.
    pub fn contains<T: Cache>(&self, carrier: impl Into<CarrierId>) -> bool {
        self.get::<T>(carrier).is_some()
    }

    // == Remove ==
    /// Removes the carrier's `T` entry and returns its handle.
    ///
    /// A later first access runs setup again.
    pub fn remove<T: Cache>(&self, carrier: impl Into<CarrierId>) -> Option<CacheHandle<T>> {
        let id = carrier.into();
        let removed = self.existing_bucket::<T>()?.take(id)?;
        self.stats.record_removed(1);
        debug!(carrier = ?id, cache_type = type_name::<T>(), "Removed cache entry");
        Some(removed)
    }

    /// Removes the carrier's entries for every cache type.
    ///
    /// Takes a `CarrierId` so it can be called from a carrier's `Drop`
    /// through [`CarrierId::of_ref`]. Returns the number of entries removed.
    pub fn remove_all(&self, carrier: impl Into<CarrierId>) -> usize {
        let id = carrier.into();
        let removed = self
            .all_buckets()
            .iter()
            .filter(|bucket| bucket.remove_carrier(id))
            .count();

        if removed > 0 {
            self.stats.record_removed(removed);
            debug!(carrier = ?id, removed, "Removed carrier cache entries");
        }
        removed
    }

    // == Sweep ==
    /// Removes every entry whose carrier has been dropped.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let swept: usize = self.all_buckets().iter().map(|bucket| bucket.sweep()).sum();
        self.stats.record_swept(swept);
        swept
    }

    // == Clear ==
    /// Drops every bucket and entry and resets statistics.
    pub fn clear(&self) {
        self.buckets.write().clear();
        self.stats.reset();
        debug!("Cache registry cleared");
    }

    // == Length ==
    /// Returns the number of entries across all cache types.
    pub fn len(&self) -> usize {
        self.all_buckets().iter().map(|bucket| bucket.len()).sum()
    }

    /// Returns true if no entry exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of cache types requested since the last clear.
    pub fn type_count(&self) -> usize {
        self.buckets.read().len()
    }

    // == Stats ==
    /// Returns current registry statistics.
    pub fn stats(&self) -> RegistryStats {
        self.stats.snapshot(self.type_count(), self.len())
    }

    /// Finds or creates the bucket for `T`.
    fn bucket<T: Cache>(&self) -> Arc<TypeBucket<T>> {
        let type_id = TypeId::of::<T>();
        let existing = self.buckets.read().get(&type_id).cloned();
        let erased = match existing {
            Some(bucket) => bucket,
            None => self
                .buckets
                .write()
                .entry(type_id)
                .or_insert_with(|| {
                    debug!(cache_type = type_name::<T>(), "Created cache bucket");
                    Arc::new(TypeBucket::<T>::new()) as Arc<dyn ErasedBucket>
                })
                .clone(),
        };
        downcast_bucket(erased)
    }

    fn existing_bucket<T: Cache>(&self) -> Option<Arc<TypeBucket<T>>> {
        let erased = self.buckets.read().get(&TypeId::of::<T>()).cloned()?;
        Some(downcast_bucket(erased))
    }

    /// Snapshot of all buckets so no registry lock is held while they are visited.
    fn all_buckets(&self) -> Vec<Arc<dyn ErasedBucket>> {
        self.buckets.read().values().cloned().collect()
    }

    fn record_access<T: Cache>(&self, carrier: CarrierId, created: bool, setup_ran: bool) {
        if created {
            self.stats.record_created(setup_ran);
            debug!(carrier = ?carrier, cache_type = type_name::<T>(), "Created cache entry");
        } else {
            self.stats.record_hit();
            trace!(carrier = ?carrier, cache_type = type_name::<T>(), "Cache hit");
        }
    }
}

fn downcast_bucket<T: Cache>(erased: Arc<dyn ErasedBucket>) -> Arc<TypeBucket<T>> {
    erased
        .into_any()
        .downcast::<TypeBucket<T>>()
        .unwrap_or_else(|_| {
            unreachable!("bucket for {} holds another payload type", type_name::<T>())
        })
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("cache_types", &self.type_count())
            .field("entries", &self.len())
            .field("init_on_set", &self.init_on_set)
            .finish()
    }
}
