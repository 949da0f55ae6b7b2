//! ChainTable: separately chained hash table with stable entry indices and
//! contiguous equal-key runs.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;
use std::collections::hash_map::RandomState;
use std::collections::TryReserveError;

/// Smallest non-empty bucket array. Bucket counts are always powers of two
/// so the bucket of a hash is `hash & (count - 1)`.
const MIN_BUCKETS: usize = 8;

/// Threshold applied when none is configured, matching the common
/// one-entry-per-bucket default of chained tables.
const DEFAULT_MAX_LOAD: f32 = 1.0;

/// Index of an occupied slot in the table's entry arena.
///
/// An index is stable for the lifetime of its entry: rehashing relinks
/// entries without moving them, so an index returned by
/// [`ChainTable::insert`] keeps resolving until that entry is removed.
/// After removal the slot may be reused by a later insertion, so a stale
/// index can resolve to a different live entry. That is memory-safe but
/// logically meaningless; callers who need to detect staleness must track
/// removals themselves.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryIndex(usize);

#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    // Chain links; `prev == None` means this entry is its bucket's head.
    prev: Option<EntryIndex>,
    next: Option<EntryIndex>,
}

#[derive(Clone)]
enum Slot<K, V> {
    Occupied(Entry<K, V>),
    Vacant { next_free: Option<EntryIndex> },
}

/// Separately chained hash table that allows duplicate keys.
///
/// Entries live in a slot arena and are threaded into one doubly linked
/// chain per bucket. Entries with equal keys always occupy one contiguous
/// run of their chain, which makes [`equal_range`](Self::equal_range) and
/// [`remove_all`](Self::remove_all) proportional to the group size rather
/// than the bucket size. Every entry caches the 64-bit hash of its key, and
/// all indexing after insertion uses the cached value; `K: Hash` is never
/// invoked again for stored entries.
pub struct ChainTable<K, V, S = RandomState> {
    hasher: S,
    heads: Vec<Option<EntryIndex>>, // one chain head per bucket, len is 0 or a power of two
    slots: Vec<Slot<K, V>>,
    free: Option<EntryIndex>, // head of the vacant-slot free list
    len: usize,
    max_load: f32,
}

impl<K, V> ChainTable<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Creates a table pre-sized so that `capacity` insertions do not rehash.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V, S> Default for ChainTable<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainTable<K, V, S> {
    pub const fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            heads: Vec::new(),
            slots: Vec::new(),
            free: None,
            len: 0,
            max_load: DEFAULT_MAX_LOAD,
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let mut table = Self::with_hasher(hasher);
        if capacity > 0 {
            table.heads = vec![None; table.required_buckets(capacity)];
            table.slots = Vec::with_capacity(capacity);
        }
        table
    }

    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    /// Current `len / bucket_count`, or `0.0` while the table has no buckets.
    pub fn load_factor(&self) -> f32 {
        if self.heads.is_empty() {
            0.0
        } else {
            self.len as f32 / self.heads.len() as f32
        }
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load
    }

    /// Sets the load-factor threshold enforced by future insertions.
    ///
    /// The change does not trigger an immediate rehash; the table grows the
    /// next time an insertion would push `len` past
    /// `bucket_count * max_load_factor`.
    ///
    /// # Panics
    ///
    /// Panics unless `max_load` is finite and greater than zero.
    pub fn set_max_load_factor(&mut self, max_load: f32) {
        assert!(
            max_load.is_finite() && max_load > 0.0,
            "max load factor must be finite and positive"
        );
        self.max_load = max_load;
    }

    /// Number of entries the table can hold before the next rehash.
    pub fn capacity(&self) -> usize {
        (self.heads.len() as f64 * f64::from(self.max_load)).floor() as usize
    }

    /// Number of entries chained in the given bucket.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= self.bucket_count()`.
    pub fn bucket_size(&self, bucket: usize) -> usize {
        let mut size = 0;
        let mut cursor = self.heads[bucket];
        while let Some(index) = cursor {
            size += 1;
            cursor = self.occupied(index).next;
        }
        size
    }

    /// Resolves an index to its key and value, or `None` if the slot is
    /// vacant or out of range.
    pub fn get(&self, index: EntryIndex) -> Option<(&K, &V)> {
        match self.slots.get(index.0) {
            Some(Slot::Occupied(entry)) => Some((&entry.key, &entry.value)),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, index: EntryIndex) -> Option<(&K, &mut V)> {
        match self.slots.get_mut(index.0) {
            Some(Slot::Occupied(entry)) => Some((&entry.key, &mut entry.value)),
            _ => None,
        }
    }

    /// Removes the entry named by `index`, returning its pair, or `None` if
    /// the slot is already vacant or out of range.
    pub fn remove(&mut self, index: EntryIndex) -> Option<(K, V)> {
        match self.slots.get(index.0) {
            Some(Slot::Occupied(_)) => {}
            _ => return None,
        }
        self.unlink(index);
        let entry = self.free_slot(index);
        self.len -= 1;
        Some((entry.key, entry.value))
    }

    /// Drops every entry while keeping the bucket array and arena capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.heads.fill(None);
        self.free = None;
        self.len = 0;
    }

    /// Exchanges the entire contents of two tables, hashers and thresholds
    /// included, without touching any entry.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for i in 0..self.slots.len() {
            let index = EntryIndex(i);
            let keep = match &mut self.slots[i] {
                Slot::Occupied(entry) => f(&entry.key, &mut entry.value),
                Slot::Vacant { .. } => continue,
            };
            if !keep {
                self.unlink(index);
                let _ = self.free_slot(index);
                self.len -= 1;
            }
        }
    }

    /// Removes and yields every entry. Dropping the iterator removes any
    /// entries not yet yielded; the bucket array is retained either way.
    pub fn drain(&mut self) -> Drain<'_, K, V, S> {
        Drain {
            table: self,
            bucket: 0,
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            heads: &self.heads,
            bucket: 0,
            cursor: None,
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        // SAFETY: a Vec buffer pointer is never null.
        let slots = unsafe { NonNull::new_unchecked(self.slots.as_mut_ptr()) };
        IterMut {
            slots,
            heads: &self.heads,
            bucket: 0,
            cursor: None,
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    fn bucket_of(&self, hash: u64) -> usize {
        debug_assert!(!self.heads.is_empty());
        (hash as usize) & (self.heads.len() - 1)
    }

    fn occupied(&self, index: EntryIndex) -> &Entry<K, V> {
        occupied_in(&self.slots, index)
    }

    fn occupied_mut(&mut self, index: EntryIndex) -> &mut Entry<K, V> {
        match &mut self.slots[index.0] {
            Slot::Occupied(entry) => entry,
            Slot::Vacant { .. } => unreachable!("chain link points at a vacant slot"),
        }
    }

    /// Takes a slot from the free list, or grows the arena by one.
    fn alloc_slot(&mut self, entry: Entry<K, V>) -> EntryIndex {
        match self.free {
            Some(index) => {
                let next_free = match &self.slots[index.0] {
                    Slot::Vacant { next_free } => *next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.free = next_free;
                self.slots[index.0] = Slot::Occupied(entry);
                index
            }
            None => {
                let index = EntryIndex(self.slots.len());
                self.slots.push(Slot::Occupied(entry));
                index
            }
        }
    }

    /// Vacates an occupied slot, pushing it onto the free list.
    fn free_slot(&mut self, index: EntryIndex) -> Entry<K, V> {
        let slot = mem::replace(
            &mut self.slots[index.0],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        match slot {
            Slot::Occupied(entry) => {
                self.free = Some(index);
                entry
            }
            Slot::Vacant { .. } => unreachable!("freeing a vacant slot"),
        }
    }

    /// Splices `index` out of its chain. The slot itself stays occupied.
    fn unlink(&mut self, index: EntryIndex) {
        let (hash, prev, next) = {
            let entry = self.occupied(index);
            (entry.hash, entry.prev, entry.next)
        };
        match prev {
            Some(prev) => self.occupied_mut(prev).next = next,
            None => {
                let bucket = self.bucket_of(hash);
                self.heads[bucket] = next;
            }
        }
        if let Some(next) = next {
            self.occupied_mut(next).prev = prev;
        }
    }

    fn link_at_head(&mut self, bucket: usize, index: EntryIndex) {
        let old_head = self.heads[bucket];
        if let Some(head) = old_head {
            self.occupied_mut(head).prev = Some(index);
        }
        let entry = self.occupied_mut(index);
        entry.prev = None;
        entry.next = old_head;
        self.heads[bucket] = Some(index);
    }

    fn link_after(&mut self, anchor: EntryIndex, index: EntryIndex) {
        let anchor_next = self.occupied(anchor).next;
        {
            let entry = self.occupied_mut(index);
            entry.prev = Some(anchor);
            entry.next = anchor_next;
        }
        if let Some(next) = anchor_next {
            self.occupied_mut(next).prev = Some(index);
        }
        self.occupied_mut(anchor).next = Some(index);
    }

    fn fits(entries: usize, buckets: usize, max_load: f32) -> bool {
        // f64 keeps the comparison exact for any realistic entry count.
        entries as f64 <= buckets as f64 * f64::from(max_load)
    }

    /// Smallest power-of-two bucket count, at least `MIN_BUCKETS`, that keeps
    /// `entries` at or under the load-factor threshold.
    fn required_buckets(&self, entries: usize) -> usize {
        let mut buckets = MIN_BUCKETS;
        while !Self::fits(entries, buckets, self.max_load) {
            buckets = buckets.checked_mul(2).expect("bucket count overflow");
        }
        buckets
    }
}

impl<K, V, S> ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Inserts an entry unconditionally; equal keys accumulate as separate
    /// entries.
    ///
    /// The key is hashed exactly once. If linking one more entry would push
    /// the load factor past the threshold, the table rehashes first, so the
    /// new entry is never relocated. The entry is linked directly after the
    /// first chain entry whose key is equal, or at the chain head when the
    /// bucket holds no equal key; either way every equal-key group remains
    /// one contiguous run. Returns the stable index of the new entry.
    pub fn insert(&mut self, key: K, value: V) -> EntryIndex {
        let hash = self.make_hash(&key);
        self.grow_for(1);
        let bucket = self.bucket_of(hash);
        let mate = self.find_in_bucket(bucket, hash, &key);
        let index = self.alloc_slot(Entry {
            key,
            value,
            hash,
            prev: None,
            next: None,
        });
        match mate {
            Some(mate) => self.link_after(mate, index),
            None => self.link_at_head(bucket, index),
        }
        self.len += 1;
        index
    }

    /// Index of the first entry whose key equals `q`, in chain order.
    pub fn find<Q>(&self, q: &Q) -> Option<EntryIndex>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.heads.is_empty() {
            return None;
        }
        let hash = self.make_hash(q);
        self.find_in_bucket(self.bucket_of(hash), hash, q)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    /// Iterator over the contiguous run of entries whose key equals `q`.
    pub fn equal_range<Q>(&self, q: &Q) -> EqualRange<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        EqualRange {
            slots: &self.slots,
            cursor: self.find(q),
        }
    }

    /// Like [`equal_range`](Self::equal_range), but yields `&mut V`.
    pub fn equal_range_mut<Q>(&mut self, q: &Q) -> EqualRangeMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let cursor = self.find(q);
        // SAFETY: a Vec buffer pointer is never null.
        let slots = unsafe { NonNull::new_unchecked(self.slots.as_mut_ptr()) };
        EqualRangeMut {
            slots,
            cursor,
            _marker: PhantomData,
        }
    }

    /// Number of entries whose key equals `q`. Proportional to the group
    /// size, not constant time.
    pub fn count<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.equal_range(q).count()
    }

    /// Unlinks and frees every entry whose key equals `q`, returning how
    /// many were removed. Never shrinks the bucket array.
    pub fn remove_all<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let first = match self.find(q) {
            Some(first) => first,
            None => return 0,
        };
        let mut removed = 0;
        let mut cursor = Some(first);
        while let Some(index) = cursor {
            let entry = self.occupied(index);
            if entry.key.borrow() != q {
                break;
            }
            cursor = entry.next;
            self.unlink(index);
            let _ = self.free_slot(index);
            self.len -= 1;
            removed += 1;
        }
        removed
    }

    /// Removes the first entry (in chain order) whose key equals `q`.
    pub fn remove_first<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.find(q)?;
        self.remove(index)
    }

    /// Bucket the key would currently be chained in, or `None` while the
    /// table has no buckets.
    pub fn bucket<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        if self.heads.is_empty() {
            None
        } else {
            Some(self.bucket_of(self.make_hash(q)))
        }
    }

    /// Rebuilds the bucket array with at least `min_buckets` buckets,
    /// rounded up to a power of two and never below what the current length
    /// requires under the threshold.
    ///
    /// Entries are relinked in place using their cached hashes; no entry
    /// moves, so indices and `&K`/`&V` addresses survive. `K: Hash` is not
    /// invoked; `K: Eq` is, to regroup equal keys within each new chain.
    pub fn rehash(&mut self, min_buckets: usize) {
        if min_buckets == 0 && self.heads.is_empty() {
            return;
        }
        let target = self.required_buckets(self.len).max(min_buckets.next_power_of_two());
        if target != self.heads.len() {
            self.rebuild_buckets(vec![None; target]);
        }
    }

    /// Ensures `additional` more entries fit without rehashing.
    pub fn reserve(&mut self, additional: usize) {
        let entries = self.len.checked_add(additional).expect("capacity overflow");
        self.slots.reserve(entries.saturating_sub(self.slots.len()));
        if !Self::fits(entries, self.heads.len(), self.max_load) {
            self.rebuild_buckets(vec![None; self.required_buckets(entries)]);
        }
    }

    /// Fallible [`reserve`](Self::reserve). On error the table's entries,
    /// chains, and bucket array are unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        // Saturating keeps an overflowing request on the fallible path: the
        // resulting near-usize::MAX slot reservation reports capacity
        // overflow from Vec instead of panicking.
        let entries = self.len.saturating_add(additional);
        self.slots
            .try_reserve(entries.saturating_sub(self.slots.len()))?;
        if !Self::fits(entries, self.heads.len(), self.max_load) {
            let target = self.required_buckets(entries);
            let mut heads = Vec::new();
            heads.try_reserve_exact(target)?;
            heads.resize(target, None);
            self.rebuild_buckets(heads);
        }
        Ok(())
    }

    fn grow_for(&mut self, additional: usize) {
        let entries = self.len.checked_add(additional).expect("capacity overflow");
        if !Self::fits(entries, self.heads.len(), self.max_load) {
            self.rebuild_buckets(vec![None; self.required_buckets(entries)]);
        }
    }

    /// Installs a fresh bucket array and relinks every live entry from its
    /// cached hash, re-establishing equal-key grouping per chain. The new
    /// array is fully allocated before any link is rewritten.
    fn rebuild_buckets(&mut self, heads: Vec<Option<EntryIndex>>) {
        debug_assert!(heads.len().is_power_of_two());
        self.heads = heads;
        for i in 0..self.slots.len() {
            let index = EntryIndex(i);
            let bucket = match &self.slots[i] {
                Slot::Occupied(entry) => self.bucket_of(entry.hash),
                Slot::Vacant { .. } => continue,
            };
            let mate = {
                let entry = self.occupied(index);
                let mut cursor = self.heads[bucket];
                let mut mate = None;
                while let Some(c) = cursor {
                    let candidate = self.occupied(c);
                    if candidate.hash == entry.hash && candidate.key == entry.key {
                        mate = Some(c);
                        break;
                    }
                    cursor = candidate.next;
                }
                mate
            };
            match mate {
                Some(mate) => self.link_after(mate, index),
                None => self.link_at_head(bucket, index),
            }
        }
    }

    fn find_in_bucket<Q>(&self, bucket: usize, hash: u64, q: &Q) -> Option<EntryIndex>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cursor = self.heads[bucket];
        while let Some(index) = cursor {
            let entry = self.occupied(index);
            if entry.hash == hash && entry.key.borrow() == q {
                return Some(index);
            }
            cursor = entry.next;
        }
        None
    }
}

impl<K, V, S> Clone for ChainTable<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        // Links are indices into the arena, so a field-wise clone preserves
        // the whole structure, including chain order and free list.
        Self {
            hasher: self.hasher.clone(),
            heads: self.heads.clone(),
            slots: self.slots.clone(),
            free: self.free,
            len: self.len,
            max_load: self.max_load,
        }
    }
}

impl<K, V, S> fmt::Debug for ChainTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Multiset equality: same key/value pairs with the same multiplicities,
/// regardless of bucket layout, insertion order, or hasher state.
impl<K, V, S> PartialEq for ChainTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        // Visit each equal-key run once: an entry starts a run when it is a
        // chain head or its key differs from the previous entry's.
        for bucket in 0..self.heads.len() {
            let mut cursor = self.heads[bucket];
            let mut prev: Option<&K> = None;
            while let Some(index) = cursor {
                let entry = self.occupied(index);
                if prev.map_or(true, |p| *p != entry.key) && !self.run_matches(other, &entry.key) {
                    return false;
                }
                prev = Some(&entry.key);
                cursor = entry.next;
            }
        }
        true
    }
}

impl<K, V, S> Eq for ChainTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// `true` when `other`'s group for `key` is a value permutation of this
    /// table's. Quadratic occurrence counting; needs only `V: PartialEq`.
    fn run_matches(&self, other: &Self, key: &K) -> bool
    where
        V: PartialEq,
    {
        let mut len = 0;
        for (_, value) in self.equal_range(key) {
            len += 1;
            let mine = self.equal_range(key).filter(|&(_, v)| v == value).count();
            let theirs = other.equal_range(key).filter(|&(_, v)| v == value).count();
            if mine != theirs {
                return false;
            }
        }
        len == other.equal_range(key).count()
    }
}

fn occupied_in<K, V>(slots: &[Slot<K, V>], index: EntryIndex) -> &Entry<K, V> {
    match &slots[index.0] {
        Slot::Occupied(entry) => entry,
        Slot::Vacant { .. } => unreachable!("chain link points at a vacant slot"),
    }
}

/// Resolves `index` to its entry through the arena base pointer.
///
/// # Safety
///
/// `slots` must point at a live arena of which `index` names an occupied,
/// in-bounds slot, and the caller must not create overlapping references to
/// that slot.
unsafe fn occupied_raw<'a, K, V>(
    slots: NonNull<Slot<K, V>>,
    index: EntryIndex,
) -> &'a mut Entry<K, V> {
    match &mut *slots.as_ptr().add(index.0) {
        Slot::Occupied(entry) => entry,
        Slot::Vacant { .. } => unreachable!("chain link points at a vacant slot"),
    }
}

/// Iterator over `(&K, &V)` in chain order: bucket by bucket, chain by
/// chain, so each equal-key group appears as one contiguous run.
pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    heads: &'a [Option<EntryIndex>],
    bucket: usize,
    cursor: Option<EntryIndex>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(index) = self.cursor {
                let entry = occupied_in(self.slots, index);
                self.cursor = entry.next;
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
            if self.bucket == self.heads.len() {
                return None;
            }
            self.cursor = self.heads[self.bucket];
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            slots: self.slots,
            heads: self.heads,
            bucket: self.bucket,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over `(&K, &mut V)` in chain order.
pub struct IterMut<'a, K, V> {
    slots: NonNull<Slot<K, V>>,
    heads: &'a [Option<EntryIndex>],
    bucket: usize,
    cursor: Option<EntryIndex>,
    remaining: usize,
    _marker: PhantomData<&'a mut (K, V)>,
}

// The iterator hands out disjoint borrows of entries the table exclusively
// owns, so it inherits the entries' thread affinity.
unsafe impl<K: Send, V: Send> Send for IterMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for IterMut<'_, K, V> {}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(index) = self.cursor {
                // SAFETY: chain links only name occupied in-bounds slots, the
                // walk visits each index exactly once, and the table is
                // exclusively borrowed for 'a, so every yielded `&mut V` is
                // disjoint from all others.
                let entry = unsafe { occupied_raw(self.slots, index) };
                let Entry {
                    key, value, next, ..
                } = entry;
                self.cursor = *next;
                self.remaining -= 1;
                return Some((&*key, value));
            }
            if self.bucket == self.heads.len() {
                return None;
            }
            self.cursor = self.heads[self.bucket];
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Iterator over one equal-key run, yielding `(&K, &V)`.
///
/// Relies on group contiguity: it starts at the first match and stops as
/// soon as the chain key changes.
pub struct EqualRange<'a, K, V> {
    slots: &'a [Slot<K, V>],
    cursor: Option<EntryIndex>,
}

impl<'a, K, V> Iterator for EqualRange<'a, K, V>
where
    K: Eq,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let entry = occupied_in(self.slots, index);
        self.cursor = match entry.next {
            Some(next) if occupied_in(self.slots, next).key == entry.key => Some(next),
            _ => None,
        };
        Some((&entry.key, &entry.value))
    }
}

impl<K: Eq, V> FusedIterator for EqualRange<'_, K, V> {}

impl<K, V> Clone for EqualRange<'_, K, V> {
    fn clone(&self) -> Self {
        EqualRange {
            slots: self.slots,
            cursor: self.cursor,
        }
    }
}

impl<K, V> fmt::Debug for EqualRange<'_, K, V>
where
    K: Eq + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over one equal-key run, yielding `(&K, &mut V)`.
pub struct EqualRangeMut<'a, K, V> {
    slots: NonNull<Slot<K, V>>,
    cursor: Option<EntryIndex>,
    _marker: PhantomData<&'a mut (K, V)>,
}

unsafe impl<K: Send, V: Send> Send for EqualRangeMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for EqualRangeMut<'_, K, V> {}

impl<'a, K, V> Iterator for EqualRangeMut<'a, K, V>
where
    K: Eq,
{
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        // SAFETY: `cursor` names an occupied in-bounds slot of the arena this
        // iterator exclusively borrows, and each index is yielded at most
        // once, so the mutable borrows handed out are disjoint.
        let entry = unsafe { occupied_raw(self.slots, index) };
        let Entry {
            key, value, next, ..
        } = entry;
        self.cursor = match *next {
            Some(next_index) => {
                // SAFETY: `next_index` is a different occupied slot (chain
                // links never point back at their own entry), so this peek
                // does not overlap the borrow split off above.
                let peek = unsafe { occupied_raw(self.slots, next_index) };
                if peek.key == *key {
                    Some(next_index)
                } else {
                    None
                }
            }
            None => None,
        };
        Some((&*key, value))
    }
}

impl<K: Eq, V> FusedIterator for EqualRangeMut<'_, K, V> {}

/// Owning iterator in chain order.
pub struct IntoIter<K, V> {
    slots: Vec<Slot<K, V>>,
    heads: Vec<Option<EntryIndex>>,
    bucket: usize,
    cursor: Option<EntryIndex>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            heads: &self.heads,
            bucket: self.bucket,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        loop {
            if let Some(index) = self.cursor {
                let slot = mem::replace(
                    &mut self.slots[index.0],
                    Slot::Vacant { next_free: None },
                );
                match slot {
                    Slot::Occupied(entry) => {
                        self.cursor = entry.next;
                        self.remaining -= 1;
                        return Some((entry.key, entry.value));
                    }
                    Slot::Vacant { .. } => unreachable!("chain link points at a vacant slot"),
                }
            }
            if self.bucket == self.heads.len() {
                return None;
            }
            self.cursor = self.heads[self.bucket];
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, V, S> IntoIterator for ChainTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        let ChainTable {
            heads, slots, len, ..
        } = self;
        IntoIter {
            slots,
            heads,
            bucket: 0,
            cursor: None,
            remaining: len,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

/// Draining iterator: pops chain heads until the table is empty. Dropping
/// it clears whatever remains.
pub struct Drain<'a, K, V, S = RandomState> {
    table: &'a mut ChainTable<K, V, S>,
    bucket: usize,
}

impl<K, V, S> Drain<'_, K, V, S> {
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.table.slots,
            heads: &self.table.heads,
            bucket: self.bucket,
            cursor: None,
            remaining: self.table.len,
        }
    }
}

impl<K, V, S> Iterator for Drain<'_, K, V, S> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        while self.bucket < self.table.heads.len() {
            match self.table.heads[self.bucket] {
                Some(index) => {
                    let entry = self.table.free_slot(index);
                    self.table.heads[self.bucket] = entry.next;
                    if let Some(next) = entry.next {
                        self.table.occupied_mut(next).prev = None;
                    }
                    self.table.len -= 1;
                    return Some((entry.key, entry.value));
                }
                None => self.bucket += 1,
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl<K, V, S> ExactSizeIterator for Drain<'_, K, V, S> {}
impl<K, V, S> FusedIterator for Drain<'_, K, V, S> {}

impl<K, V, S> Drop for Drain<'_, K, V, S> {
    fn drop(&mut self) {
        self.table.clear();
    }
}

impl<K, V, S> fmt::Debug for Drain<'_, K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
