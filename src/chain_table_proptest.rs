#![cfg(test)]

// Property tests for ChainTable kept inside the crate so they can reach
// internal introspection without feature gates.

use crate::chain_table::{ChainTable, EntryIndex};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length. A small pool
// guarantees duplicate-key pressure.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    RemoveAll(usize),
    RemoveOne(usize),
    Find(usize),
    Count(usize),
    Range(usize),
    Contains(String),
    MutateGroup(usize, i32),
    Rehash(u16),
    Reserve(u8),
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=6).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            // Weighted toward inserts so groups actually build up; the
            // narrow value range makes exact duplicate pairs common.
            4 => (idx.clone(), 0..8i32).prop_map(|(i, v)| OpI::Insert(i, v)),
            1 => idx.clone().prop_map(OpI::RemoveAll),
            1 => idx.clone().prop_map(OpI::RemoveOne),
            1 => idx.clone().prop_map(OpI::Find),
            1 => idx.clone().prop_map(OpI::Count),
            1 => idx.clone().prop_map(OpI::Range),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::MutateGroup(i, d)),
            1 => (0u16..300).prop_map(OpI::Rehash),
            1 => any::<u8>().prop_map(OpI::Reserve),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn model_len(model: &HashMap<Key, Vec<i32>>) -> usize {
    model.values().map(Vec::len).sum()
}

fn sorted(values: &[i32]) -> Vec<i32> {
    let mut v = values.to_vec();
    v.sort_unstable();
    v
}

// Drives one op sequence against the table and a HashMap<Key, Vec<i32>>
// model, checking per-op postconditions plus a ledger of every live index.
fn apply_ops<S: BuildHasher>(
    sut: &mut ChainTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, Vec<i32>> = HashMap::new();
    let mut ledger: HashMap<EntryIndex, (Key, i32)> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let before = model.get(&k).map_or(0, Vec::len);
                let index = sut.insert(k.clone(), v);
                model.entry(k.clone()).or_default().push(v);
                prop_assert_eq!(sut.get(index), Some((&k, &v)));
                prop_assert_eq!(sut.count(k.0.as_str()), before + 1);
                let prev = ledger.insert(index, (k, v));
                prop_assert!(prev.is_none(), "insert returned a live index");
            }
            OpI::RemoveAll(i) => {
                let k = key_from(pool, i);
                let expected = model.remove(&k).map_or(0, |values| values.len());
                prop_assert_eq!(sut.remove_all(k.0.as_str()), expected);
                prop_assert!(!sut.contains_key(k.0.as_str()));
                ledger.retain(|_, (lk, _)| *lk != k);
            }
            OpI::RemoveOne(i) => {
                let k = key_from(pool, i);
                let first = sut.find(k.0.as_str());
                match sut.remove_first(k.0.as_str()) {
                    Some((rk, rv)) => {
                        prop_assert_eq!(&rk, &k);
                        let index = first.expect("find precedes remove_first");
                        let tracked = ledger.remove(&index).expect("index tracked");
                        prop_assert_eq!(tracked, (rk, rv));
                        let values = model.get_mut(&k).expect("model has the key");
                        let pos = values
                            .iter()
                            .position(|&mv| mv == rv)
                            .expect("value in model");
                        values.swap_remove(pos);
                        if values.is_empty() {
                            model.remove(&k);
                        }
                    }
                    None => {
                        prop_assert!(first.is_none());
                        prop_assert!(!model.contains_key(&k));
                    }
                }
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let found = sut.find(k.0.as_str());
                prop_assert_eq!(found.is_some(), model.contains_key(&k));
                if let Some(index) = found {
                    let (fk, _) = sut.get(index).expect("found index resolves");
                    prop_assert_eq!(fk, &k);
                }
            }
            OpI::Count(i) => {
                let k = key_from(pool, i);
                let expected = model.get(&k).map_or(0, Vec::len);
                prop_assert_eq!(sut.count(k.0.as_str()), expected);
            }
            OpI::Range(i) => {
                let k = key_from(pool, i);
                let mut got = Vec::new();
                for (rk, rv) in sut.equal_range(k.0.as_str()) {
                    prop_assert_eq!(rk, &k);
                    got.push(*rv);
                }
                got.sort_unstable();
                let expected = model.get(&k).map_or_else(Vec::new, |values| sorted(values));
                prop_assert_eq!(got, expected);
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::MutateGroup(i, d) => {
                let k = key_from(pool, i);
                for (_, value) in sut.equal_range_mut(k.0.as_str()) {
                    *value = value.saturating_add(d);
                }
                if let Some(values) = model.get_mut(&k) {
                    for value in values {
                        *value = value.saturating_add(d);
                    }
                }
                for (lk, lv) in ledger.values_mut() {
                    if *lk == k {
                        *lv = lv.saturating_add(d);
                    }
                }
            }
            OpI::Rehash(min_buckets) => {
                let min_buckets = min_buckets as usize;
                sut.rehash(min_buckets);
                if min_buckets > 0 {
                    prop_assert!(sut.bucket_count() >= min_buckets);
                }
            }
            OpI::Reserve(additional) => {
                let additional = additional as usize;
                sut.reserve(additional);
                prop_assert!(sut.capacity() >= sut.len() + additional);
            }
            OpI::Iterate => {
                // Contiguity check: each key's entries must form one
                // unbroken stretch of the walk.
                let mut groups: BTreeMap<Key, Vec<i32>> = BTreeMap::new();
                let mut previous: Option<Key> = None;
                for (k, v) in sut.iter() {
                    if previous.as_ref() != Some(k) {
                        prop_assert!(
                            !groups.contains_key(k),
                            "key {:?} reappeared after its run ended",
                            k
                        );
                    }
                    groups.entry(k.clone()).or_default().push(*v);
                    previous = Some(k.clone());
                }
                prop_assert_eq!(groups.len(), model.len());
                for (k, values) in &model {
                    let got = groups.get(k).expect("key present in walk");
                    prop_assert_eq!(sorted(got), sorted(values));
                }
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model_len(&model));
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        if sut.bucket_count() > 0 {
            let bound = sut.bucket_count() as f64 * f64::from(sut.max_load_factor());
            prop_assert!(sut.len() as f64 <= bound, "load factor bound violated");
        }
        for (index, (k, v)) in &ledger {
            prop_assert_eq!(sut.get(*index), Some((k, v)));
        }
    }
    Ok(())
}

// Property: State-machine equivalence against a HashMap<Key, Vec<i32>>
// model. Invariants exercised across random operation sequences:
// - Inserting an existing key grows its group; `len` counts every entry.
// - remove_all/remove_first agree with the model's per-key multiset.
// - find/count/equal_range parity, including borrowed &str queries.
// - Every live index keeps resolving to its pair across rehash/reserve;
//   removed indices leave the ledger with their entry.
// - Full walks keep each key's entries contiguous.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainTable<Key, i32> = ChainTable::new();
        apply_ops(&mut sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher: every entry lands in bucket
// zero, so grouping, lookup, and removal are resolved purely by Eq along
// a single chain.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above under worst-case
// collision behavior (constant hasher).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: ChainTable<Key, i32, ConstBuildHasher> =
            ChainTable::with_hasher(ConstBuildHasher);
        apply_ops(&mut sut, &pool, ops)?;
    }
}
