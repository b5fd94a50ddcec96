//! Carrier Extensions
//!
//! Method-style access to a carrier's caches, plus [`CachedAsset`] for
//! carriers that own a single cache type with a setup hook.

use std::sync::Arc;

use crate::registry::{Cache, CacheCarrier, CacheHandle, CacheRegistry, CarrierId};

// == Cached Asset ==
/// A carrier with one dedicated runtime cache.
///
/// ```
/// use std::sync::Arc;
/// use carrier_cache::{AssetExt, Cache, CacheCarrier, CacheRegistry, CachedAsset};
///
/// #[derive(Default)]
/// struct Stats {
///     uses: u32,
/// }
/// impl Cache for Stats {}
///
/// struct Weapon {
///     base_uses: u32,
/// }
/// impl CacheCarrier for Weapon {}
///
/// impl CachedAsset for Weapon {
///     type Cache = Stats;
///
///     fn cache_setup(&self, cache: &mut Stats) {
///         cache.uses = self.base_uses;
///     }
/// }
///
/// let registry = CacheRegistry::new();
/// let sword = Arc::new(Weapon { base_uses: 3 });
/// assert_eq!(sword.asset_cache_in(&registry).read().uses, 3);
/// ```
pub trait CachedAsset: CacheCarrier + Sized {
    /// Runtime cache type for this asset
    type Cache: Cache;

    /// Called once when the cache entry is first created.
    fn cache_setup(&self, _cache: &mut Self::Cache) {}
}

// == Carrier Extension ==
/// Cache accessors on any `Arc`-held carrier.
///
/// The plain methods use [`CacheRegistry::global`]; the `_in` variants take
/// an explicit registry.
pub trait CarrierExt {
    /// Returns this carrier's `T` cache, creating it on first access.
    fn cache<T: Cache>(&self, on_first_init: impl FnOnce(&mut T)) -> CacheHandle<T>;

    /// Replaces this carrier's `T` cache.
    fn set_cache<T: Cache>(&self, on_first_init: impl FnOnce(&mut T), value: T);

    /// Removes every cache held for this carrier.
    fn remove_caches(&self) -> usize;

    /// [`CarrierExt::cache`] against `registry`.
    fn cache_in<T: Cache>(
        &self,
        registry: &CacheRegistry,
        on_first_init: impl FnOnce(&mut T),
    ) -> CacheHandle<T>;

    /// [`CarrierExt::set_cache`] against `registry`.
    fn set_cache_in<T: Cache>(
        &self,
        registry: &CacheRegistry,
        on_first_init: impl FnOnce(&mut T),
        value: T,
    );
}

impl<C: CacheCarrier> CarrierExt for Arc<C> {
    fn cache<T: Cache>(&self, on_first_init: impl FnOnce(&mut T)) -> CacheHandle<T> {
        self.cache_in(CacheRegistry::global(), on_first_init)
    }

    fn set_cache<T: Cache>(&self, on_first_init: impl FnOnce(&mut T), value: T) {
        self.set_cache_in(CacheRegistry::global(), on_first_init, value);
    }

    fn remove_caches(&self) -> usize {
        CacheRegistry::global().remove_all(CarrierId::of(self))
    }

    fn cache_in<T: Cache>(
        &self,
        registry: &CacheRegistry,
        on_first_init: impl FnOnce(&mut T),
    ) -> CacheHandle<T> {
        registry.get_or_create(self, on_first_init)
    }

    fn set_cache_in<T: Cache>(
        &self,
        registry: &CacheRegistry,
        on_first_init: impl FnOnce(&mut T),
        value: T,
    ) {
        registry.set(self, on_first_init, value);
    }
}

// == Asset Extension ==
/// Accessors for the dedicated cache of a [`CachedAsset`].
pub trait AssetExt {
    /// The asset's cache type
    type Cache: Cache;

    /// Returns the asset's cache, running `cache_setup` on first access.
    fn asset_cache(&self) -> CacheHandle<Self::Cache>;

    /// Replaces the asset's cache, running `cache_setup` if the entry is new.
    fn set_asset_cache(&self, value: Self::Cache);

    /// [`AssetExt::asset_cache`] against `registry`.
    fn asset_cache_in(&self, registry: &CacheRegistry) -> CacheHandle<Self::Cache>;

    /// [`AssetExt::set_asset_cache`] against `registry`.
    fn set_asset_cache_in(&self, registry: &CacheRegistry, value: Self::Cache);
}

impl<A: CachedAsset> AssetExt for Arc<A> {
    type Cache = A::Cache;

    fn asset_cache(&self) -> CacheHandle<A::Cache> {
        self.asset_cache_in(CacheRegistry::global())
    }

    fn set_asset_cache(&self, value: A::Cache) {
        self.set_asset_cache_in(CacheRegistry::global(), value);
    }

    fn asset_cache_in(&self, registry: &CacheRegistry) -> CacheHandle<A::Cache> {
        registry.get_or_create(self, |cache: &mut A::Cache| self.cache_setup(cache))
    }

    fn set_asset_cache_in(&self, registry: &CacheRegistry, value: A::Cache) {
        registry.set(self, |cache: &mut A::Cache| self.cache_setup(cache), value);
    }
}
