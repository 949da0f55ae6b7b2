// ChainedMultimap property tests (consolidated).
//
// Property 1: facade equivalence against a HashMap<String, Vec<i32>> model.
//  - Model: per-key Vec of values; value multisets compared after sorting.
//  - Operations: insert, remove (whole group), remove_one, count/get
//    probes, get_all walks.
//  - Invariant after each step: len() equals the model's total entry
//    count; contains_key matches the model.
//
// Property 2: construction-order independence.
//  - Two maps built from the same pairs in different orders (one of them
//    pre-sized) compare equal; dropping any single entry breaks equality.
use proptest::prelude::*;

use chained_multimap::ChainedMultimap;
use std::collections::HashMap;

// Property 1: model equivalence under a random op stream.
proptest! {
    #[test]
    fn prop_facade_matches_model(
        keys in 1usize..=5,
        ops in proptest::collection::vec((0u8..=6u8, 0usize..100usize, -8i32..8), 1..100)
    ) {
        let mut m: ChainedMultimap<String, i32> = ChainedMultimap::new();
        let mut model: HashMap<String, Vec<i32>> = HashMap::new();

        for (op, raw_k, v) in ops {
            let k = raw_k % keys;
            let key = format!("k{}", k);
            match op {
                // Insert dominates so groups actually build up.
                0 | 1 | 2 => {
                    m.insert(key.clone(), v);
                    model.entry(key.clone()).or_default().push(v);
                }
                // Remove the whole group; the count must match the model's.
                3 => {
                    let expected = model.remove(&key).map_or(0, |vs| vs.len());
                    prop_assert_eq!(m.remove(&key), expected);
                }
                // Remove one occurrence; the value must exist in the model.
                4 => {
                    match m.remove_one(&key) {
                        Some(got) => {
                            let vs = model.get_mut(&key).expect("model has key");
                            let pos = vs
                                .iter()
                                .position(|&x| x == got)
                                .expect("removed value in model");
                            vs.swap_remove(pos);
                            if vs.is_empty() {
                                model.remove(&key);
                            }
                        }
                        None => prop_assert!(!model.contains_key(&key)),
                    }
                }
                // Read-only probes.
                5 => {
                    let expected = model.get(&key).map_or(0, Vec::len);
                    prop_assert_eq!(m.count(key.as_str()), expected);
                    prop_assert_eq!(m.get(key.as_str()).is_some(), expected > 0);
                }
                6 => {
                    let mut got: Vec<i32> =
                        m.get_all(key.as_str()).map(|(_, value)| *value).collect();
                    got.sort_unstable();
                    let mut expected = model.get(&key).cloned().unwrap_or_default();
                    expected.sort_unstable();
                    prop_assert_eq!(got, expected);
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(m.len(), model.values().map(Vec::len).sum::<usize>());
            prop_assert_eq!(m.contains_key(key.as_str()), model.contains_key(&key));
        }

        // Final check: every group matches the model's multiset.
        for (key, values) in &model {
            let mut got: Vec<i32> = m.get_all(key.as_str()).map(|(_, value)| *value).collect();
            got.sort_unstable();
            let mut expected = values.clone();
            expected.sort_unstable();
            prop_assert_eq!(got, expected);
        }
    }
}

// Property 2: equality does not depend on insertion order or pre-sizing.
proptest! {
    #[test]
    fn prop_equality_is_order_insensitive(
        pairs in proptest::collection::vec((0u8..6, -4i32..4), 0..40),
        rotate in 0usize..40,
    ) {
        let mut forward: ChainedMultimap<u8, i32> = ChainedMultimap::new();
        for &(k, v) in &pairs {
            forward.insert(k, v);
        }

        // Same pairs, rotated start, and a pre-sized table: the bucket
        // layout differs but the multiset is identical.
        let mut rotated: ChainedMultimap<u8, i32> = ChainedMultimap::with_capacity(64);
        let pivot = if pairs.is_empty() { 0 } else { rotate % pairs.len() };
        for &(k, v) in pairs[pivot..].iter().chain(&pairs[..pivot]) {
            rotated.insert(k, v);
        }

        prop_assert_eq!(&forward, &rotated);
        for k in 0u8..6 {
            prop_assert_eq!(forward.count(&k), rotated.count(&k));
        }

        // Dropping any one entry must break equality.
        if !pairs.is_empty() {
            let (k, _) = pairs[pivot];
            let mut smaller = rotated;
            smaller.remove_one(&k);
            prop_assert_ne!(forward, smaller);
        }
    }
}
