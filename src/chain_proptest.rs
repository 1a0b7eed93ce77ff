#![cfg(test)]

// Property tests for ChainTable kept inside the crate, next to the modules
// they exercise.

use crate::config::{GrowthPolicy, TableConfig};
use crate::error::TableError;
use crate::hash::hash;
use crate::table::{ChainTable, Insertion};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Delete(usize),
    Search(usize),
    Rehash,
    Clear,
    Stats,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    // Small alphabet so byte sums repeat and chains form.
    proptest::collection::vec("[a-e]{1,4}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Delete),
            2 => idx.clone().prop_map(OpI::Search),
            1 => Just(OpI::Rehash),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Stats),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Inserts of present keys overwrite and report the previous value;
//   `count` never grows for them.
// - `collided` is reported exactly when the target chain was non-empty.
// - `delete` returns the stored value, then `KeyNotFound` on repeat.
// - `rehash` doubles the capacity and keeps every key's value.
// - After every op the audit passes and stats agree with chain contents.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let cfg = TableConfig::new().with_initial_capacity(3).with_max_capacity(3 << 6);
        let mut sut = ChainTable::with_config(cfg).unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = &pool[i];
                    let was_empty = sut.chain(sut.bucket_index(k)).unwrap().next().is_none();
                    match sut.insert(k, v).unwrap() {
                        Insertion::Updated { bucket, previous } => {
                            prop_assert_eq!(model.get(k).copied(), Some(previous));
                            prop_assert_eq!(bucket, hash(k, sut.capacity()));
                        }
                        Insertion::Inserted { bucket, collided } => {
                            prop_assert!(!model.contains_key(k));
                            prop_assert_eq!(collided, !was_empty);
                            prop_assert_eq!(bucket, hash(k, sut.capacity()));
                        }
                    }
                    model.insert(k.clone(), v);
                }
                OpI::Delete(i) => {
                    let k = &pool[i];
                    match model.remove(k) {
                        Some(v) => prop_assert_eq!(sut.delete(k), Ok(v)),
                        None => prop_assert_eq!(sut.delete(k), Err(TableError::KeyNotFound)),
                    }
                    prop_assert_eq!(sut.delete(k), Err(TableError::KeyNotFound));
                }
                OpI::Search(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.search(k), model.get(k).copied());
                }
                OpI::Rehash => {
                    let before = sut.capacity();
                    match sut.rehash() {
                        Ok(()) => prop_assert_eq!(sut.capacity(), before * 2),
                        Err(e) => {
                            prop_assert!(e.is_allocation_failure());
                            prop_assert_eq!(sut.capacity(), before);
                        }
                    }
                }
                OpI::Clear => {
                    let cap = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), cap);
                }
                OpI::Stats => {
                    let s = sut.stats();
                    let lengths: Vec<usize> = sut.chain_lengths().collect();
                    prop_assert_eq!(s.used_buckets, lengths.iter().filter(|&&l| l > 0).count());
                    prop_assert_eq!(s.longest_chain, lengths.iter().copied().max().unwrap_or(0));
                    prop_assert_eq!(s.collisions + s.used_buckets, s.count);
                }
            }

            // Post-conditions after each op
            prop_assert!(sut.validate().is_ok());
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.iter().count(), model.len());
            let seen: BTreeMap<String, i32> =
                sut.iter().map(|(k, v)| (k.to_string(), v)).collect();
            let expected: BTreeMap<String, i32> =
                model.iter().map(|(k, &v)| (k.clone(), v)).collect();
            prop_assert_eq!(seen, expected);
        }
    }
}

// Property: with load-factor growth enabled, the same model equivalence holds
// and the load factor never exceeds the limit after an insert.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_auto_growth_respects_limit((pool, ops) in arb_scenario()) {
        let cfg = TableConfig::new()
            .with_initial_capacity(1)
            .with_growth(GrowthPolicy::LoadFactor(0.75));
        let mut sut = ChainTable::with_config(cfg).unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = &pool[i];
                    sut.insert(k, v).unwrap();
                    model.insert(k.clone(), v);
                    prop_assert!(sut.load_factor() <= 0.75);
                }
                OpI::Delete(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.delete(k).ok(), model.remove(k));
                }
                OpI::Search(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.search(k), model.get(k).copied());
                }
                OpI::Rehash => {
                    // The default ceiling is far away for these sizes.
                    sut.rehash().unwrap();
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                }
                OpI::Stats => {
                    prop_assert_eq!(sut.stats().count, model.len());
                }
            }
            prop_assert!(sut.validate().is_ok());
            prop_assert_eq!(sut.len(), model.len());
        }
    }
}
