//! ChainedMultimap: the map-flavored facade over [`ChainTable`].

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use std::collections::hash_map::RandomState;
use std::collections::TryReserveError;

use crate::chain_table::{ChainTable, Drain, EqualRange, EqualRangeMut, IntoIter, Iter, IterMut};

/// A hash multimap: a map in which one key can hold any number of values.
///
/// [`insert`](Self::insert) always adds an entry, never overwrites. The
/// values of one key are queried together with [`get_all`](Self::get_all),
/// counted with [`count`](Self::count), and removed together with
/// [`remove`](Self::remove). In every iteration order the entries of one
/// key appear consecutively.
///
/// # Examples
///
/// ```
/// use chained_multimap::ChainedMultimap;
///
/// let mut phones = ChainedMultimap::new();
/// phones.insert("ada", "555-0100");
/// phones.insert("ada", "555-0199");
/// phones.insert("grace", "555-0142");
///
/// assert_eq!(phones.len(), 3);
/// assert_eq!(phones.count("ada"), 2);
///
/// let mut ada: Vec<&str> = phones.get_all("ada").map(|(_, v)| *v).collect();
/// ada.sort_unstable();
/// assert_eq!(ada, ["555-0100", "555-0199"]);
///
/// assert_eq!(phones.remove("ada"), 2);
/// assert!(!phones.contains_key("ada"));
/// ```
#[derive(Clone)]
pub struct ChainedMultimap<K, V, S = RandomState> {
    table: ChainTable<K, V, S>,
}

impl<K, V> ChainedMultimap<K, V, RandomState> {
    /// Creates an empty `ChainedMultimap`.
    ///
    /// No buckets are allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map: ChainedMultimap<i32, &str> = ChainedMultimap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: ChainTable::new(),
        }
    }

    /// Creates an empty `ChainedMultimap` sized so that at least `capacity`
    /// entries can be inserted without rehashing.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map: ChainedMultimap<i32, &str> = ChainedMultimap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: ChainTable::with_capacity(capacity),
        }
    }
}

impl<K, V, S> ChainedMultimap<K, V, S> {
    /// Creates an empty `ChainedMultimap` that hashes with `hasher`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::hash_map::RandomState;
    ///
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::with_hasher(RandomState::new());
    /// map.insert(1, "one");
    /// ```
    #[must_use]
    pub const fn with_hasher(hasher: S) -> Self {
        Self {
            table: ChainTable::with_hasher(hasher),
        }
    }

    /// Creates an empty `ChainedMultimap` with the given capacity and hasher.
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            table: ChainTable::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Returns a reference to the map's [`BuildHasher`].
    #[must_use]
    pub const fn hasher(&self) -> &S {
        self.table.hasher()
    }

    /// Number of entries the map can hold before the next rehash.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of entries, counting every duplicate separately.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map = ChainedMultimap::from([(1, "a"), (1, "b")]);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of buckets currently allocated. Zero until first use.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Current `len / bucket_count`, or `0.0` for a map with no buckets.
    #[must_use]
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// The load-factor threshold that triggers growth, `1.0` by default.
    #[must_use]
    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// Sets the load-factor threshold enforced by future insertions.
    ///
    /// # Panics
    ///
    /// Panics unless `max_load` is finite and greater than zero.
    pub fn set_max_load_factor(&mut self, max_load: f32) {
        self.table.set_max_load_factor(max_load);
    }

    /// Number of entries chained in the given bucket.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= self.bucket_count()`.
    #[must_use]
    pub fn bucket_size(&self, bucket: usize) -> usize {
        self.table.bucket_size(bucket)
    }

    /// Removes all entries. Keeps the allocated buckets for reuse.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Exchanges the contents of two maps without moving any entry.
    pub fn swap(&mut self, other: &mut Self) {
        self.table.swap(&mut other.table);
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::from([(1, 10), (1, 11), (2, 20)]);
    /// map.retain(|&k, v| k == 1 && *v < 11);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.table.retain(f);
    }

    /// Removes and yields every entry. Dropping the iterator early removes
    /// the rest; the allocated buckets are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::from([(1, "a"), (2, "b")]);
    /// let drained: Vec<(i32, &str)> = map.drain().collect();
    /// assert_eq!(drained.len(), 2);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V, S> {
        self.table.drain()
    }

    /// Iterator over `(&K, &V)`. Entries of one key are adjacent.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map = ChainedMultimap::from([("a", 1), ("b", 2)]);
    /// let mut pairs: Vec<(&str, i32)> = map.iter().map(|(&k, &v)| (k, v)).collect();
    /// pairs.sort_unstable();
    /// assert_eq!(pairs, [("a", 1), ("b", 2)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    /// Iterator over `(&K, &mut V)`.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    /// Iterator over all keys, with each duplicate key yielded once per
    /// entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map = ChainedMultimap::from([("a", 1), ("a", 2), ("b", 3)]);
    /// let mut keys: Vec<&str> = map.keys().copied().collect();
    /// keys.sort_unstable();
    /// assert_eq!(keys, ["a", "a", "b"]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterator over all values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Iterator over all values, mutably.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::from([("a", 1), ("b", 2)]);
    /// for v in map.values_mut() {
    ///     *v *= 10;
    /// }
    /// let mut values: Vec<i32> = map.values().copied().collect();
    /// values.sort_unstable();
    /// assert_eq!(values, [10, 20]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Consumes the map, yielding every key.
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys {
            inner: self.table.into_iter(),
        }
    }

    /// Consumes the map, yielding every value.
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues {
            inner: self.table.into_iter(),
        }
    }
}

impl<K, V, S> ChainedMultimap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts a key-value pair.
    ///
    /// Inserting an existing key never overwrites: the new pair is stored
    /// alongside the old ones and joins their group.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::new();
    /// map.insert(1, "a");
    /// map.insert(1, "b");
    /// assert_eq!(map.count(&1), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        self.table.insert(key, value);
    }

    /// Returns one value of the key, the first in chain order, or `None`.
    ///
    /// Use [`get_all`](Self::get_all) for the whole group.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map = ChainedMultimap::from([(1, "a")]);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.table.find(key)?;
        self.table.get(index).map(|(_, v)| v)
    }

    /// Like [`get`](Self::get), but also returns the stored key.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.table.find(key)?;
        self.table.get(index)
    }

    /// Mutable access to one value of the key, the first in chain order.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.table.find(key)?;
        self.table.get_mut(index).map(|(_, v)| v)
    }

    /// Iterator over every entry of the key, yielding `(&K, &V)`.
    ///
    /// The group is one contiguous chain run, so the walk touches only the
    /// group plus one extra entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map = ChainedMultimap::from([("k", 1), ("k", 2), ("other", 3)]);
    /// let mut values: Vec<i32> = map.get_all("k").map(|(_, v)| *v).collect();
    /// values.sort_unstable();
    /// assert_eq!(values, [1, 2]);
    /// ```
    pub fn get_all<Q>(&self, key: &Q) -> EqualRange<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.equal_range(key)
    }

    /// Like [`get_all`](Self::get_all), yielding `(&K, &mut V)`.
    pub fn get_all_mut<Q>(&mut self, key: &Q) -> EqualRangeMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.equal_range_mut(key)
    }

    /// Number of entries stored under the key.
    #[must_use]
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.count(key)
    }

    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let map = ChainedMultimap::from([(1, "a")]);
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.contains_key(key)
    }

    /// Removes every entry of the key, returning how many were removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::from([(1, "a"), (1, "b"), (2, "c")]);
    /// assert_eq!(map.remove(&1), 2);
    /// assert_eq!(map.remove(&1), 0);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove_all(key)
    }

    /// Removes one entry of the key, the first in chain order, and returns
    /// its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::from([(1, "a")]);
    /// assert_eq!(map.remove_one(&1), Some("a"));
    /// assert_eq!(map.remove_one(&1), None);
    /// ```
    pub fn remove_one<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove_first(key).map(|(_, v)| v)
    }

    /// Bucket the key currently hashes into, or `None` for a map with no
    /// buckets yet.
    #[must_use]
    pub fn bucket<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.table.bucket(key)
    }

    /// Rebuilds the bucket array with at least `min_buckets` buckets,
    /// without moving or re-hashing any entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map = ChainedMultimap::from([(1, "a"), (2, "b")]);
    /// map.rehash(64);
    /// assert!(map.bucket_count() >= 64);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn rehash(&mut self, min_buckets: usize) {
        self.table.rehash(min_buckets);
    }

    /// Ensures `additional` more entries fit without rehashing.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible [`reserve`](Self::reserve): on allocation failure the map
    /// is unchanged and the error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultimap;
    ///
    /// let mut map: ChainedMultimap<i32, i32> = ChainedMultimap::new();
    /// map.try_reserve(100).expect("out of memory");
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.table.try_reserve(additional)
    }
}

impl<K, V, S> Default for ChainedMultimap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for ChainedMultimap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two multimaps are equal when they hold the same key-value pairs with the
/// same multiplicities, in any order.
impl<K, V, S> PartialEq for ChainedMultimap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl<K, V, S> Eq for ChainedMultimap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> FromIterator<(K, V)> for ChainedMultimap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedMultimap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for ChainedMultimap<K, V, S>
where
    K: Eq + Hash + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

/// # Examples
///
/// ```
/// use chained_multimap::ChainedMultimap;
///
/// let map = ChainedMultimap::from([(1, "a"), (1, "b")]);
/// assert_eq!(map.count(&1), 2);
/// ```
impl<K, V, const N: usize> From<[(K, V); N]> for ChainedMultimap<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, S> IntoIterator for ChainedMultimap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        self.table.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedMultimap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedMultimap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

/// Iterator over a multimap's keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over a multimap's values.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over a multimap's values, mutably.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Owning iterator over a multimap's keys.
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {}
impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for IntoKeys<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.iter().map(|(key, _)| key))
            .finish()
    }
}

/// Owning iterator over a multimap's values.
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {}
impl<K, V> FusedIterator for IntoValues<K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for IntoValues<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.iter().map(|(_, value)| value))
            .finish()
    }
}
