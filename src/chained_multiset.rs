//! ChainedMultiset: a bag of values built on [`ChainedMultimap`] with `()`
//! payloads.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use std::collections::hash_map::RandomState;
use std::collections::TryReserveError;

use crate::chain_table;
use crate::chained_multimap::{ChainedMultimap, IntoKeys, Keys};

/// A hash multiset: a set that counts how many times each value was
/// inserted.
///
/// # Examples
///
/// ```
/// use chained_multimap::ChainedMultiset;
///
/// let mut bag = ChainedMultiset::new();
/// bag.insert("apple");
/// bag.insert("apple");
/// bag.insert("pear");
///
/// assert_eq!(bag.len(), 3);
/// assert_eq!(bag.count("apple"), 2);
/// assert_eq!(bag.remove("apple"), 2);
/// assert!(!bag.contains("apple"));
/// ```
#[derive(Clone)]
pub struct ChainedMultiset<T, S = RandomState> {
    map: ChainedMultimap<T, (), S>,
}

impl<T> ChainedMultiset<T, RandomState> {
    /// Creates an empty `ChainedMultiset`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: ChainedMultimap::new(),
        }
    }

    /// Creates an empty `ChainedMultiset` sized for at least `capacity`
    /// insertions without rehashing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: ChainedMultimap::with_capacity(capacity),
        }
    }
}

impl<T, S> ChainedMultiset<T, S> {
    /// Creates an empty `ChainedMultiset` that hashes with `hasher`.
    #[must_use]
    pub const fn with_hasher(hasher: S) -> Self {
        Self {
            map: ChainedMultimap::with_hasher(hasher),
        }
    }

    /// Creates an empty `ChainedMultiset` with the given capacity and
    /// hasher.
    #[must_use]
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            map: ChainedMultimap::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Returns a reference to the set's [`BuildHasher`].
    #[must_use]
    pub const fn hasher(&self) -> &S {
        self.map.hasher()
    }

    /// Number of values the set can hold before the next rehash.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Number of values, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all values. Keeps the allocated buckets for reuse.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterator over the values, with duplicates yielded once per
    /// insertion. Duplicates appear adjacently.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultiset;
    ///
    /// let bag = ChainedMultiset::from(["a", "b", "a"]);
    /// let mut values: Vec<&str> = bag.iter().copied().collect();
    /// values.sort_unstable();
    /// assert_eq!(values, ["a", "a", "b"]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.keys(),
        }
    }

    /// Removes and yields every value. Dropping the iterator early removes
    /// the rest.
    pub fn drain(&mut self) -> Drain<'_, T, S> {
        Drain {
            inner: self.map.drain(),
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|value, _| f(value));
    }
}

impl<T, S> ChainedMultiset<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts a value. Duplicates accumulate; nothing is ever replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultiset;
    ///
    /// let mut bag = ChainedMultiset::new();
    /// bag.insert(7);
    /// bag.insert(7);
    /// assert_eq!(bag.count(&7), 2);
    /// ```
    pub fn insert(&mut self, value: T) {
        self.map.insert(value, ());
    }

    /// Removes every occurrence of the value, returning how many there
    /// were.
    pub fn remove<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove(value)
    }

    /// Removes one occurrence of the value. Returns whether one was
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use chained_multimap::ChainedMultiset;
    ///
    /// let mut bag = ChainedMultiset::from([1, 1]);
    /// assert!(bag.remove_one(&1));
    /// assert_eq!(bag.count(&1), 1);
    /// ```
    pub fn remove_one<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.remove_one(value).is_some()
    }

    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(value)
    }

    /// Number of occurrences of the value.
    #[must_use]
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.count(value)
    }

    /// Ensures `additional` more values fit without rehashing.
    pub fn reserve(&mut self, additional: usize) {
        self.map.reserve(additional);
    }

    /// Fallible [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.map.try_reserve(additional)
    }
}

impl<T, S> Default for ChainedMultiset<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> fmt::Debug for ChainedMultiset<T, S>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Two multisets are equal when every value occurs the same number of
/// times in both.
impl<T, S> PartialEq for ChainedMultiset<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T, S> Eq for ChainedMultiset<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T, S> FromIterator<T> for ChainedMultiset<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for ChainedMultiset<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|value| (value, ())));
    }
}

impl<'a, T, S> Extend<&'a T> for ChainedMultiset<T, S>
where
    T: Eq + Hash + Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/// # Examples
///
/// ```
/// use chained_multimap::ChainedMultiset;
///
/// let bag = ChainedMultiset::from([1, 1, 2]);
/// assert_eq!(bag.count(&1), 2);
/// ```
impl<T, const N: usize> From<[T; N]> for ChainedMultiset<T, RandomState>
where
    T: Eq + Hash,
{
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, S> IntoIterator for ChainedMultiset<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.map.into_keys(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a ChainedMultiset<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Iterator over a multiset's values.
pub struct Iter<'a, T> {
    inner: Keys<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Owning iterator over a multiset's values.
pub struct IntoIter<T> {
    inner: IntoKeys<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

/// Draining iterator over a multiset's values.
pub struct Drain<'a, T, S = RandomState> {
    inner: chain_table::Drain<'a, T, (), S>,
}

impl<T, S> Iterator for Drain<'_, T, S> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(value, _)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, S> ExactSizeIterator for Drain<'_, T, S> {}
impl<T, S> FusedIterator for Drain<'_, T, S> {}

impl<T, S> fmt::Debug for Drain<'_, T, S>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.inner.iter().map(|(value, _)| value))
            .finish()
    }
}
