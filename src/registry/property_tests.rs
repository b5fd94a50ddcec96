//! Property-Based Tests for Registry Module
//!
//! Uses proptest to check the registry against a simple model.

use proptest::prelude::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::registry::{Cache, CacheCarrier, CacheHandle, CacheRegistry};

// == Test Configuration ==
const CARRIER_POOL: usize = 4;

#[derive(Debug, Default, Clone, PartialEq)]
struct Counter {
    n: i64,
}

impl Cache for Counter {}

#[derive(Debug, Default, Clone, PartialEq)]
struct Tally {
    n: i64,
}

impl Cache for Tally {}

struct Carrier;

impl CacheCarrier for Carrier {}

// == Strategies ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Counter,
    Tally,
}

/// Generates a sequence of registry operations for testing
#[derive(Debug, Clone)]
enum RegistryOp {
    Get { carrier: usize, kind: Kind },
    Bump { carrier: usize, kind: Kind, by: i64 },
    Set { carrier: usize, kind: Kind, value: i64 },
    Remove { carrier: usize, kind: Kind },
}

fn kind_strategy() -> impl Strategy<Value = Kind> {
    prop_oneof![Just(Kind::Counter), Just(Kind::Tally)]
}

fn registry_op_strategy() -> impl Strategy<Value = RegistryOp> {
    let carrier = 0..CARRIER_POOL;
    prop_oneof![
        (carrier.clone(), kind_strategy())
            .prop_map(|(carrier, kind)| RegistryOp::Get { carrier, kind }),
        (carrier.clone(), kind_strategy(), -50i64..50)
            .prop_map(|(carrier, kind, by)| RegistryOp::Bump { carrier, kind, by }),
        (carrier.clone(), kind_strategy(), any::<i64>())
            .prop_map(|(carrier, kind, value)| RegistryOp::Set { carrier, kind, value }),
        (carrier, kind_strategy())
            .prop_map(|(carrier, kind)| RegistryOp::Remove { carrier, kind }),
    ]
}

fn current(registry: &CacheRegistry, carrier: &Arc<Carrier>, kind: Kind) -> Option<i64> {
    match kind {
        Kind::Counter => registry.get::<Counter>(carrier).map(|h| h.read().n),
        Kind::Tally => registry.get::<Tally>(carrier).map(|h| h.read().n),
    }
}

fn run_op(
    registry: &CacheRegistry,
    carriers: &[Arc<Carrier>],
    op: &RegistryOp,
    setups: &Cell<usize>,
) {
    let bump = |_: &mut Counter| setups.set(setups.get() + 1);
    let bump_tally = |_: &mut Tally| setups.set(setups.get() + 1);
    match *op {
        RegistryOp::Get { carrier, kind } => match kind {
            Kind::Counter => {
                registry.get_or_create(&carriers[carrier], bump);
            }
            Kind::Tally => {
                registry.get_or_create(&carriers[carrier], bump_tally);
            }
        },
        RegistryOp::Bump { carrier, kind, by } => match kind {
            Kind::Counter => registry.get_or_create(&carriers[carrier], bump).write().n += by,
            Kind::Tally => registry.get_or_create(&carriers[carrier], bump_tally).write().n += by,
        },
        RegistryOp::Set { carrier, kind, value } => match kind {
            Kind::Counter => registry.set(&carriers[carrier], bump, Counter { n: value }),
            Kind::Tally => registry.set(&carriers[carrier], bump_tally, Tally { n: value }),
        },
        RegistryOp::Remove { carrier, kind } => match kind {
            Kind::Counter => {
                registry.remove::<Counter>(&carriers[carrier]);
            }
            Kind::Tally => {
                registry.remove::<Tally>(&carriers[carrier]);
            }
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, every (type, carrier) pair holds the
    // value a plain map model predicts, and setup runs exactly once per
    // absent-to-present transition.
    #[test]
    fn prop_registry_matches_model(ops in prop::collection::vec(registry_op_strategy(), 1..60)) {
        let registry = CacheRegistry::new();
        let carriers: Vec<Arc<Carrier>> = (0..CARRIER_POOL).map(|_| Arc::new(Carrier)).collect();
        let setups = Cell::new(0usize);

        let mut model: HashMap<(usize, Kind), i64> = HashMap::new();
        let mut expected_setups = 0usize;

        for op in &ops {
            match *op {
                RegistryOp::Get { carrier, kind } => {
                    if !model.contains_key(&(carrier, kind)) {
                        expected_setups += 1;
                        model.insert((carrier, kind), 0);
                    }
                }
                RegistryOp::Bump { carrier, kind, by } => {
                    let entry = model.entry((carrier, kind)).or_insert_with(|| {
                        expected_setups += 1;
                        0
                    });
                    *entry += by;
                }
                RegistryOp::Set { carrier, kind, value } => {
                    if !model.contains_key(&(carrier, kind)) {
                        expected_setups += 1;
                    }
                    model.insert((carrier, kind), value);
                }
                RegistryOp::Remove { carrier, kind } => {
                    model.remove(&(carrier, kind));
                }
            }

            run_op(&registry, &carriers, op, &setups);
        }

        prop_assert_eq!(setups.get(), expected_setups, "Setup count mismatch");
        prop_assert_eq!(registry.len(), model.len(), "Entry count mismatch");

        for (index, carrier) in carriers.iter().enumerate() {
            for kind in [Kind::Counter, Kind::Tally] {
                prop_assert_eq!(
                    current(&registry, carrier, kind),
                    model.get(&(index, kind)).copied(),
                    "Value mismatch for carrier {} {:?}", index, kind
                );
            }
        }
    }

    // For any value, setting it on an unseen pair runs setup once and the
    // stored value is the one given, not the default instance.
    #[test]
    fn prop_set_on_new_entry_stores_value(value in any::<i64>()) {
        let registry = CacheRegistry::new();
        let carrier = Arc::new(Carrier);
        let setups = Cell::new(0);

        let bump = |_: &mut Counter| setups.set(setups.get() + 1);
        registry.set(&carrier, bump, Counter { n: value });

        let handle: CacheHandle<Counter> = registry.get_or_create(&carrier, bump);
        prop_assert_eq!(handle.read().n, value);
        prop_assert_eq!(setups.get(), 1);
    }

    // With setup on set disabled, setting never runs setup and the value
    // is still stored.
    #[test]
    fn prop_set_without_init_on_set(values in prop::collection::vec(any::<i64>(), 1..10)) {
        let registry = CacheRegistry::from_config(&Config {
            init_on_set: false,
            ..Config::default()
        });
        let carrier = Arc::new(Carrier);
        let setups = Cell::new(0);

        for value in &values {
            let bump = |_: &mut Tally| setups.set(setups.get() + 1);
            registry.set(&carrier, bump, Tally { n: *value });
        }

        prop_assert_eq!(setups.get(), 0);
        prop_assert_eq!(current(&registry, &carrier, Kind::Tally), values.last().copied());
    }

    // Dropping any subset of carriers and sweeping leaves exactly the
    // entries of the survivors.
    #[test]
    fn prop_sweep_keeps_only_live_carriers(
        dropped in prop::collection::vec(any::<bool>(), CARRIER_POOL)
    ) {
        let registry = CacheRegistry::new();
        let mut carriers: Vec<Option<Arc<Carrier>>> =
            (0..CARRIER_POOL).map(|_| Some(Arc::new(Carrier))).collect();

        for carrier in carriers.iter().flatten() {
            registry.get_or_default::<Counter, _>(carrier);
            registry.get_or_default::<Tally, _>(carrier);
        }

        for (slot, drop_it) in carriers.iter_mut().zip(&dropped) {
            if *drop_it {
                slot.take();
            }
        }

        let dropped_count = dropped.iter().filter(|d| **d).count();
        prop_assert_eq!(registry.sweep(), dropped_count * 2);
        prop_assert_eq!(registry.len(), (CARRIER_POOL - dropped_count) * 2);
    }
}
