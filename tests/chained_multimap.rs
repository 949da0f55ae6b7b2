// ChainedMultimap unit test suite (consolidated).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Accumulation: insert never overwrites; every entry counts toward len.
// - Grouping: the entries of one key are adjacent in every iteration
//   mode, and get_all yields exactly the group.
// - Removal: remove takes the whole group and reports its size;
//   remove_one takes a single entry.
// - Equality: maps compare as multisets of pairs, independent of
//   insertion order, capacity, and hasher seeds.
// - Introspection: bucket/bucket_count/load_factor stay consistent with
//   the configured threshold across reserve and rehash.
use chained_multimap::ChainedMultimap;

// Test: the end-to-end lifecycle of a small map.
// Assumes: count/get_all see exactly the inserted group.
// Verifies: remove reports the group size; clear empties the map.
#[test]
fn insert_query_remove_clear_lifecycle() {
    let mut m = ChainedMultimap::new();
    m.insert(1, "one".to_string());
    m.insert(2, "two".to_string());
    m.insert(1, "uno".to_string());
    m.insert(3, "three".to_string());

    assert_eq!(m.len(), 4);
    assert_eq!(m.count(&1), 2);
    assert_eq!(m.count(&2), 1);

    let mut ones: Vec<String> = m.get_all(&1).map(|(_, v)| v.clone()).collect();
    ones.sort_unstable();
    assert_eq!(ones, ["one".to_string(), "uno".to_string()]);

    assert_eq!(m.remove(&1), 2);
    assert_eq!(m.len(), 2);
    assert!(!m.contains_key(&1));

    let mut rest: Vec<(i32, String)> = m.iter().map(|(&k, v)| (k, v.clone())).collect();
    rest.sort_unstable();
    assert_eq!(rest, [(2, "two".to_string()), (3, "three".to_string())]);

    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.count(&2), 0);
}

// Test: single-value accessors on a key with duplicates.
// Assumes: get/get_key_value/get_mut all resolve the same first entry.
// Verifies: the returned value belongs to the group; mutation sticks.
#[test]
fn single_value_accessors_pick_one_of_the_group() {
    let mut m = ChainedMultimap::new();
    m.insert("k", 1);
    assert_eq!(m.get("k"), Some(&1));

    m.insert("k", 2);
    let first = *m.get("k").unwrap();
    assert!(first == 1 || first == 2);
    assert_eq!(m.get_key_value("k"), Some((&"k", &first)));

    let v = m.get_mut("k").unwrap();
    *v += 100;
    assert_eq!(m.get("k"), Some(&(first + 100)));

    assert_eq!(m.get("absent"), None);
    assert_eq!(m.get_key_value("absent"), None);
    assert_eq!(m.get_mut("absent"), None);
}

// Test: borrowed queries with str against String keys.
// Assumes: Borrow<str> lookup matches owned-key lookup.
// Verifies: all query and removal entry points accept &str.
#[test]
fn borrowed_queries_with_str() {
    let mut m: ChainedMultimap<String, i32> = ChainedMultimap::new();
    m.insert("alpha".to_string(), 1);
    m.insert("alpha".to_string(), 2);
    m.insert("beta".to_string(), 3);

    assert!(m.contains_key("alpha"));
    assert_eq!(m.count("alpha"), 2);
    assert_eq!(m.get_all("alpha").count(), 2);
    assert!(m.bucket("alpha").is_some());

    if let Some(v) = m.get_mut("beta") {
        *v += 10;
    }
    assert_eq!(m.get("beta"), Some(&13));

    assert!(m.remove_one("alpha").is_some());
    assert_eq!(m.remove("alpha"), 1);
    assert_eq!(m.remove("alpha"), 0);
}

// Test: construction paths all agree.
// Assumes: equality compares pair multisets.
// Verifies: From/FromIterator/Extend/manual inserts and the by-ref
// Extend all build the same map; Default is empty.
#[test]
fn construction_paths_agree() {
    let pairs = [("a", 1), ("a", 2), ("b", 3)];

    let from_arr = ChainedMultimap::from(pairs);
    let from_iter: ChainedMultimap<&str, i32> = pairs.into_iter().collect();
    let mut extended = ChainedMultimap::new();
    extended.extend(pairs);
    let mut manual = ChainedMultimap::with_capacity(8);
    for (k, v) in pairs {
        manual.insert(k, v);
    }
    let mut by_ref = ChainedMultimap::new();
    by_ref.extend(from_arr.iter());

    assert_eq!(from_arr, from_iter);
    assert_eq!(from_iter, extended);
    assert_eq!(extended, manual);
    assert_eq!(by_ref, from_arr);

    assert!(ChainedMultimap::<i32, i32>::default().is_empty());
}

// Test: multiset equality semantics.
// Assumes: per-key groups compare as value multisets.
// Verifies: order-insensitive equality; multiplicity differences break it.
#[test]
fn equality_is_order_insensitive() {
    let forward = ChainedMultimap::from([(1, 'a'), (1, 'b'), (2, 'c')]);
    let reversed = ChainedMultimap::from([(2, 'c'), (1, 'b'), (1, 'a')]);
    assert_eq!(forward, reversed);

    let fewer = ChainedMultimap::from([(1, 'a'), (2, 'c')]);
    assert_ne!(forward, fewer);

    let multiplicities = ChainedMultimap::from([(1, 'a'), (1, 'a'), (2, 'c')]);
    assert_ne!(forward, multiplicities);

    let other_values = ChainedMultimap::from([(1, 'a'), (1, 'x'), (2, 'c')]);
    assert_ne!(forward, other_values);
}

// Test: retain and the mutable views.
// Assumes: retain sees and may mutate every entry exactly once.
// Verifies: filtered entries disappear; values_mut/get_all_mut mutate in
// place.
#[test]
fn retain_and_mutable_views() {
    let mut m = ChainedMultimap::from([("x", 1), ("x", 2), ("y", 3), ("z", 4)]);
    m.retain(|&k, v| {
        *v *= 10;
        k != "z"
    });
    assert_eq!(m.len(), 3);
    assert_eq!(m.count("z"), 0);

    for v in m.values_mut() {
        *v += 1;
    }
    let mut values: Vec<i32> = m.values().copied().collect();
    values.sort_unstable();
    assert_eq!(values, [11, 21, 31]);

    for (_, v) in m.get_all_mut("x") {
        *v = -*v;
    }
    let mut xs: Vec<i32> = m.get_all("x").map(|(_, v)| *v).collect();
    xs.sort_unstable();
    assert_eq!(xs, [-21, -11]);
}

// Test: drain yields everything and keeps the bucket array.
// Assumes: dropping a live drain removes whatever it has not yielded.
// Verifies: full and partial drains both leave an empty map.
#[test]
fn drain_empties_but_keeps_buckets() {
    let mut m = ChainedMultimap::from([(1, "a"), (1, "b"), (2, "c")]);
    let buckets = m.bucket_count();

    let mut drained: Vec<(i32, &str)> = m.drain().collect();
    drained.sort_unstable();
    assert_eq!(drained, [(1, "a"), (1, "b"), (2, "c")]);
    assert!(m.is_empty());
    assert_eq!(m.bucket_count(), buckets);

    m.extend([(5, "e"), (6, "f")]);
    {
        let mut d = m.drain();
        assert!(d.next().is_some());
    }
    assert!(m.is_empty());
}

// Test: every iteration mode sees the same entries.
// Assumes: keys of one group are adjacent in the borrowed walk.
// Verifies: iter/keys/values/into_keys/into_values/into_iter agree on
// the multiset; mutable walks can update every value.
#[test]
fn iteration_modes_agree() {
    let m = ChainedMultimap::from([("a", 1), ("b", 2), ("a", 3)]);

    assert_eq!(m.iter().count(), 3);
    assert_eq!(m.iter().len(), 3);
    assert_eq!(m.keys().count(), 3);
    assert_eq!(m.values().count(), 3);

    // Duplicate keys must be adjacent.
    let keys: Vec<&str> = m.keys().copied().collect();
    let a_positions: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, &k)| k == "a")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(a_positions.len(), 2);
    assert!(
        a_positions.windows(2).all(|w| w[1] == w[0] + 1),
        "duplicate keys must form one adjacent run"
    );

    let mut into_keys: Vec<&str> = m.clone().into_keys().collect();
    into_keys.sort_unstable();
    assert_eq!(into_keys, ["a", "a", "b"]);

    let mut into_values: Vec<i32> = m.clone().into_values().collect();
    into_values.sort_unstable();
    assert_eq!(into_values, [1, 2, 3]);

    let mut owned: Vec<(&str, i32)> = m.into_iter().collect();
    owned.sort_unstable();
    assert_eq!(owned, [("a", 1), ("a", 3), ("b", 2)]);

    let mut m2 = ChainedMultimap::from([(1, 1), (2, 10)]);
    for (_, v) in &mut m2 {
        *v += 1;
    }
    let total: i32 = (&m2).into_iter().map(|(_, v)| *v).sum();
    assert_eq!(total, 13);
}

// Test: removing one entry at a time versus the whole group.
// Assumes: remove_one takes exactly one entry of the group; removal
// never shrinks the bucket array.
// Verifies: counts step down by one; remove reports what is left; the
// bucket count survives emptying the map.
#[test]
fn remove_one_then_remove_rest() {
    let mut m = ChainedMultimap::from([("k", 1), ("k", 2), ("k", 3)]);
    let buckets = m.bucket_count();

    let first = m.remove_one("k").unwrap();
    assert!([1, 2, 3].contains(&first));
    assert_eq!(m.count("k"), 2);

    assert_eq!(m.remove("k"), 2);
    assert_eq!(m.remove_one("k"), None);
    assert!(m.is_empty());
    assert_eq!(m.bucket_count(), buckets);
}

// Test: bucket introspection, reserve, try_reserve, and rehash.
// Assumes: bucket counts are powers of two and at least 8 once allocated.
// Verifies: reserve prevents growth rehashes; rehash honors the minimum;
// bucket sizes sum to len.
#[test]
fn introspection_reserve_and_rehash() {
    let mut m: ChainedMultimap<u32, u32> = ChainedMultimap::new();
    assert_eq!(m.bucket_count(), 0);
    assert_eq!(m.load_factor(), 0.0);
    assert_eq!(m.max_load_factor(), 1.0);
    assert_eq!(m.bucket(&1), None);

    m.insert(1, 1);
    assert!(m.bucket_count() >= 8);
    assert!(m.bucket_count().is_power_of_two());
    assert!(m.bucket(&1).unwrap() < m.bucket_count());
    let filled: usize = (0..m.bucket_count()).map(|b| m.bucket_size(b)).sum();
    assert_eq!(filled, 1);

    m.reserve(500);
    assert!(m.capacity() >= 501);
    let buckets = m.bucket_count();
    for i in 0..500 {
        m.insert(i, i);
    }
    assert_eq!(m.bucket_count(), buckets, "reserved inserts must not rehash");

    m.try_reserve(100).expect("small reserve succeeds");
    assert!(m.try_reserve(usize::MAX).is_err());
    assert_eq!(m.len(), 501);

    m.rehash(2048);
    assert_eq!(m.bucket_count(), 2048);
    assert_eq!(m.len(), 501);
    assert_eq!(m.count(&1), 2);

    m.set_max_load_factor(0.5);
    assert_eq!(m.max_load_factor(), 0.5);
}

// Test: swap exchanges whole maps.
// Assumes: swap moves no entries, only the containers' internals.
// Verifies: contents, lengths, and lookups all switch sides.
#[test]
fn swap_exchanges_maps() {
    let mut a = ChainedMultimap::from([(1, "one")]);
    let mut b = ChainedMultimap::from([(2, "two"), (2, "dos")]);

    a.swap(&mut b);
    assert_eq!(a.len(), 2);
    assert_eq!(a.count(&2), 2);
    assert_eq!(b.len(), 1);
    assert_eq!(b.get(&1), Some(&"one"));
}
